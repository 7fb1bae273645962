/// Rendering of configured text against the parsed command.
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use tracing::debug;

/// Named values available to configured templates.
///
/// `input` is the argument list joined with single spaces. `author` is only
/// present for comment bodies, where it names the author of the target issue
/// or pull request.
#[derive(Debug, Clone, Serialize)]
pub struct RenderContext {
    pub args: Vec<String>,
    pub input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl RenderContext {
    pub fn new(args: &[String]) -> Self {
        Self {
            args: args.to_vec(),
            input: args.join(" "),
            author: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }
}

/// Substitute `{{name}}` placeholders in `template` with values from the
/// context. Dotted access into the argument list (`{{args.0}}`) is supported.
///
/// Placeholders that resolve to nothing render as the empty string, matching
/// the minimal-templating behavior config authors rely on. A template that
/// fails to parse at all is passed through unchanged.
pub fn render(template: &str, context: &RenderContext) -> String {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Chainable);

    match env.render_str(template, context) {
        Ok(rendered) => rendered,
        Err(e) => {
            debug!("Template failed to render, using it verbatim: {e}");
            template.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(args: &[&str]) -> RenderContext {
        RenderContext::new(&args.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_render_input_and_args() {
        let ctx = context(&["bug", "triage"]);
        assert_eq!(render("all: {{input}}", &ctx), "all: bug triage");
        assert_eq!(render("first: {{args.0}}", &ctx), "first: bug");
        assert_eq!(render("second: {{args.1}}", &ctx), "second: triage");
    }

    #[test]
    fn test_render_author() {
        let ctx = context(&[]).with_author("alice");
        assert_eq!(render("Thanks {{author}}!", &ctx), "Thanks alice!");
    }

    #[test]
    fn test_unresolved_placeholders_render_empty() {
        let ctx = context(&["one"]);
        assert_eq!(render("[{{missing}}]", &ctx), "[]");
        assert_eq!(render("[{{args.5}}]", &ctx), "[]");
        assert_eq!(render("[{{author}}]", &ctx), "[]");
        assert_eq!(render("[{{missing.nested}}]", &ctx), "[]");
    }

    #[test]
    fn test_plain_text_untouched() {
        let ctx = context(&[]);
        assert_eq!(render("no placeholders here", &ctx), "no placeholders here");
    }

    #[test]
    fn test_invalid_template_passed_through() {
        let ctx = context(&[]);
        assert_eq!(render("broken {{ %", &ctx), "broken {{ %");
    }

    #[test]
    fn test_rendering_is_pure() {
        let ctx = context(&["x"]);
        let first = render("{{args.0}}-{{input}}", &ctx);
        let second = render("{{args.0}}-{{input}}", &ctx);
        assert_eq!(first, second);
        assert_eq!(ctx.args, vec!["x".to_string()]);
    }
}
