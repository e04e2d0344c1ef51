//! A parsed template, ready to execute.

use super::exec;
use super::lexer::Lexer;
use super::node::{self, Node};
use super::parse::Parser;
use crate::config::RenderConfig;
use crate::error::Result;
use crate::funcs::{CallContext, FuncRegistry};

/// Immutable result of the parse phase.
///
/// Helpers are bound at parse time, so executing needs only a
/// [`CallContext`]. A `Template` is `Send + Sync` and may be executed any
/// number of times, from any number of threads.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse `source` using the delimiters and name from `config`.
    ///
    /// Text outside actions may be in any encoding; it is copied through
    /// byte for byte. An invalid `config` fails before any lexing.
    pub fn parse(source: &[u8], funcs: &FuncRegistry, config: &RenderConfig) -> Result<Self> {
        config.validate()?;
        let items = Lexer::new(&config.name, source, &config.left_delim, &config.right_delim)
            .tokenize()?;
        let nodes = Parser::new(&config.name, funcs, items).parse()?;
        Ok(Self {
            name: config.name.clone(),
            nodes,
        })
    }

    /// Run the template. Returns the full output or an error, never both.
    pub fn execute(&self, ctx: &CallContext<'_>) -> Result<Vec<u8>> {
        Ok(exec::execute(&self.name, &self.nodes, ctx)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of `{{ ... }}` actions, comments and `else`/`end` excluded.
    pub fn action_count(&self) -> usize {
        node::count_actions(&self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::MapEnv;
    use crate::error::TemplateError;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_template_is_send_sync() {
        assert_send_sync::<Template>();
        assert_send_sync::<FuncRegistry>();
    }

    #[test]
    fn test_parse_once_execute_many() {
        let template = Template::parse(
            br#"{{env "WHO" | default "nobody"}}"#,
            &FuncRegistry::BUILTIN,
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(template.name(), "file");
        assert_eq!(template.action_count(), 1);

        let first = MapEnv::new().with("WHO", "ann");
        let second = MapEnv::new();
        assert_eq!(template.execute(&CallContext::new(&first)).unwrap(), b"ann");
        assert_eq!(template.execute(&CallContext::new(&second)).unwrap(), b"nobody");
    }

    #[test]
    fn test_parse_uses_config_name_and_delims() {
        let config = RenderConfig {
            name: "nginx.conf".into(),
            left_delim: "[[".into(),
            right_delim: "]]".into(),
            ..RenderConfig::default()
        };
        let template =
            Template::parse(b"{{keep}} [[ \"x\" ]]", &FuncRegistry::BUILTIN, &config).unwrap();
        let env = MapEnv::new();
        assert_eq!(template.execute(&CallContext::new(&env)).unwrap(), b"{{keep}} x");

        let err = Template::parse(b"[[ nope ]]", &FuncRegistry::BUILTIN, &config).unwrap_err();
        let TemplateError::Parse(err) = err else {
            panic!("expected a parse error, got {err:?}");
        };
        assert_eq!(err.name, "nginx.conf");
    }

    #[test]
    fn test_parse_rejects_empty_delims() {
        let config = RenderConfig {
            left_delim: String::new(),
            right_delim: String::new(),
            ..RenderConfig::default()
        };
        let err = Template::parse(b"a", &FuncRegistry::BUILTIN, &config).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidConfig(_)));

        let config = RenderConfig {
            right_delim: String::new(),
            ..RenderConfig::default()
        };
        assert!(Template::parse(b"{{ 1 }}", &FuncRegistry::BUILTIN, &config).is_err());
    }

    #[test]
    fn test_comments_are_not_actions() {
        let template = Template::parse(
            b"{{/* header */}}text",
            &FuncRegistry::BUILTIN,
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(template.action_count(), 0);
    }

    #[test]
    fn test_branches_count_as_actions() {
        let template = Template::parse(
            b"{{if 1}}{{\"a\"}}{{else}}{{\"b\"}}{{end}}",
            &FuncRegistry::BUILTIN,
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(template.action_count(), 3);
    }
}
