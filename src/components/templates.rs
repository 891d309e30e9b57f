use std::fs;
use std::io;
use std::path::Path;
use log::{debug, info};
use crate::errors::WikiError;
use crate::services::LinkService;
use crate::types::{Mode, Page};
use crate::utils::escape_html;

const DEFAULT_VIEW: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{{TITLE}}</title></head><body><h1>{{TITLE}}</h1><p>[<a href=\"/edit/{{TITLE}}\">edit</a>]</p><div>{{BODY}}</div></body></html>\n";

const DEFAULT_EDIT: &str = "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Editing {{TITLE}}</title></head><body><h1>Editing {{TITLE}}</h1><form action=\"/save/{{TITLE}}\" method=\"POST\"><div><textarea name=\"body\" rows=\"20\" cols=\"80\">{{BODY}}</textarea></div><div><input type=\"submit\" value=\"Save\"></div></form></body></html>\n";

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A page template parsed into literal text and `{{FIELD}}` placeholders
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template source. Only an unterminated `{{` is a parse error.
    pub fn parse(name: &str, source: &str) -> Result<Self, WikiError> {
        let mut segments = Vec::new();
        let mut rest = source;
        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or_else(|| {
                WikiError::TemplateError(format!("{}: unterminated placeholder", name))
            })?;
            segments.push(Segment::Field(after[..end].trim().to_string()));
            rest = &after[end + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Self { name: name.to_string(), segments })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute against a page into `out`. Field values are HTML-escaped.
    pub fn execute(&self, page: &Page, out: &mut Vec<u8>) -> Result<(), WikiError> {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.extend_from_slice(text.as_bytes()),
                Segment::Field(field) => {
                    let value = match field.as_str() {
                        "TITLE" => escape_html(&page.title),
                        "BODY" => escape_html(&String::from_utf8_lossy(&page.body)),
                        other => {
                            return Err(WikiError::RenderError(format!(
                                "{}: page has no field {}",
                                self.name, other
                            )));
                        }
                    };
                    out.extend_from_slice(value.as_bytes());
                }
            }
        }
        Ok(())
    }
}

/// Holds the compiled view/edit templates and the link rewriter
pub struct Renderer {
    view: Template,
    edit: Template,
    links: LinkService,
}

impl Renderer {
    pub fn new(view: Template, edit: Template, links: LinkService) -> Self {
        Self { view, edit, links }
    }

    /// Renderer using the built-in templates
    pub fn with_defaults() -> Result<Self, WikiError> {
        Ok(Self::new(
            Template::parse("view.html", DEFAULT_VIEW)?,
            Template::parse("edit.html", DEFAULT_EDIT)?,
            LinkService::new()?,
        ))
    }

    /// Load `view.html` and `edit.html` from `dir`, falling back to built-ins for missing files
    pub fn from_dir(dir: &Path) -> Result<Self, WikiError> {
        Ok(Self::new(
            load_template(dir, "view.html", DEFAULT_VIEW)?,
            load_template(dir, "edit.html", DEFAULT_EDIT)?,
            LinkService::new()?,
        ))
    }

    /// Render a page fully into memory. Link tokens are rewritten only in view mode,
    /// after the template has run.
    pub fn render(&self, mode: Mode, page: &Page) -> Result<Vec<u8>, WikiError> {
        let template = match mode {
            Mode::View => &self.view,
            Mode::Edit => &self.edit,
        };
        debug!("Rendering '{}' with {}", page.title, template.name());

        let mut buf = Vec::new();
        template.execute(page, &mut buf)?;
        match mode {
            Mode::View => Ok(self.links.rewrite(&buf).into_owned()),
            Mode::Edit => Ok(buf),
        }
    }
}

fn load_template(dir: &Path, name: &str, fallback: &str) -> Result<Template, WikiError> {
    let path = dir.join(name);
    match fs::read_to_string(&path) {
        Ok(source) => {
            info!("Loaded template {:?}", path);
            Template::parse(name, &source)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Template {:?} not found, using built-in {}", path, name);
            Template::parse(name, fallback)
        }
        Err(e) => Err(WikiError::TemplateError(format!("{:?}: {}", path, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_str(renderer: &Renderer, mode: Mode, page: &Page) -> String {
        String::from_utf8(renderer.render(mode, page).unwrap()).unwrap()
    }

    #[test]
    fn view_mode_rewrites_links() {
        let renderer = Renderer::with_defaults().unwrap();
        let html = render_str(&renderer, Mode::View, &Page::new("Test", "hello [World]"));
        assert!(html.contains("hello <a href=\"/view/World\">[World]</a>"));
    }

    #[test]
    fn edit_mode_keeps_tokens_verbatim() {
        let renderer = Renderer::with_defaults().unwrap();
        let html = render_str(&renderer, Mode::Edit, &Page::new("Test", "hello [Foo]"));
        assert!(html.contains(">hello [Foo]</textarea>"));
        assert!(!html.contains("<a href=\"/view/Foo\">"));
    }

    #[test]
    fn edit_form_for_empty_page_has_empty_body() {
        let renderer = Renderer::with_defaults().unwrap();
        let html = render_str(&renderer, Mode::Edit, &Page::empty("New"));
        assert!(html.contains("<textarea name=\"body\" rows=\"20\" cols=\"80\"></textarea>"));
        assert!(html.contains("action=\"/save/New\""));
    }

    #[test]
    fn body_is_escaped() {
        let renderer = Renderer::with_defaults().unwrap();
        let html = render_str(&renderer, Mode::View, &Page::new("X", "<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn rewrite_sees_literal_template_text() {
        let view = Template::parse("view.html", "<nav>[Home]</nav>{{BODY}}").unwrap();
        let edit = Template::parse("edit.html", "{{BODY}}").unwrap();
        let renderer = Renderer::new(view, edit, LinkService::new().unwrap());
        let html = render_str(&renderer, Mode::View, &Page::new("X", "body"));
        assert_eq!(html, "<nav><a href=\"/view/Home\">[Home]</a></nav>body");
    }

    #[test]
    fn unknown_field_is_render_error() {
        let view = Template::parse("view.html", "{{AUTHOR}}").unwrap();
        let edit = Template::parse("edit.html", "{{BODY}}").unwrap();
        let renderer = Renderer::new(view, edit, LinkService::new().unwrap());
        assert!(matches!(
            renderer.render(Mode::View, &Page::empty("X")),
            Err(WikiError::RenderError(_))
        ));
    }

    #[test]
    fn unterminated_placeholder_fails_parse() {
        assert!(matches!(
            Template::parse("bad.html", "<p>{{TITLE</p>"),
            Err(WikiError::TemplateError(_))
        ));
    }

    #[test]
    fn from_dir_prefers_files_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("view.html"), "V:{{ TITLE }}").unwrap();
        let renderer = Renderer::from_dir(dir.path()).unwrap();
        assert_eq!(render_str(&renderer, Mode::View, &Page::empty("A")), "V:A");
        assert!(render_str(&renderer, Mode::Edit, &Page::empty("A")).contains("Editing A"));
    }
}
