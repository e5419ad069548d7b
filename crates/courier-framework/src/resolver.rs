//! Dynamic payload routing.
//!
//! A dynamic payload names its own handler as `<module-path>:<function-name>`,
//! e.g. `"shop.cart:checkout"`. The names are keys into a table of handlers
//! registered at startup, never instructions to load code.

use std::collections::HashMap;
use std::fmt;

use courier_core::{ConfigurationError, RouteError, RouteResult};

use crate::handler::BoxedHandler;

/// A parsed `<module-path>:<function-name>` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRef<'a> {
    /// Everything before the first `:`.
    pub module: &'a str,
    /// Everything after the first `:`.
    pub function: &'a str,
}

impl<'a> RouteRef<'a> {
    /// Parses a payload, splitting at the first `:`.
    ///
    /// Both parts must be non-empty.
    pub fn parse(payload: &'a str) -> RouteResult<Self> {
        match payload.split_once(':') {
            Some((module, function)) if !module.is_empty() && !function.is_empty() => {
                Ok(Self { module, function })
            }
            _ => Err(RouteError::MalformedPayload {
                payload: payload.to_string(),
            }),
        }
    }
}

impl fmt::Display for RouteRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.function)
    }
}

/// A table of named handlers grouped by module path.
#[derive(Default, Clone)]
pub struct DynamicResolver {
    modules: HashMap<String, HashMap<String, BoxedHandler>>,
}

impl DynamicResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` as `module:function`, replacing any previous one.
    ///
    /// The module path may not contain `:`, otherwise the route could never
    /// be parsed back out of a payload.
    pub fn register(
        &mut self,
        module: impl Into<String>,
        function: impl Into<String>,
        handler: BoxedHandler,
    ) -> Result<(), ConfigurationError> {
        let module = module.into();
        let function = function.into();

        if module.is_empty() || function.is_empty() || module.contains(':') {
            return Err(ConfigurationError::InvalidRoute { module, function });
        }

        self.modules
            .entry(module)
            .or_default()
            .insert(function, handler);
        Ok(())
    }

    /// Resolves a payload to its handler.
    ///
    /// Fails with [`RouteError::MalformedPayload`] if the payload has no
    /// `module:function` shape, and with [`RouteError::ModuleNotFound`] or
    /// [`RouteError::FunctionNotFound`] if nothing is registered under it.
    pub fn resolve(&self, payload: &str) -> RouteResult<&BoxedHandler> {
        let route = RouteRef::parse(payload)?;

        let module = self
            .modules
            .get(route.module)
            .ok_or_else(|| RouteError::ModuleNotFound {
                module: route.module.to_string(),
            })?;

        module
            .get(route.function)
            .ok_or_else(|| RouteError::FunctionNotFound {
                module: route.module.to_string(),
                function: route.function.to_string(),
            })
    }

    /// Returns the number of registered routes.
    pub fn len(&self) -> usize {
        self.modules.values().map(HashMap::len).sum()
    }

    /// Returns `true` if no route is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for DynamicResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut routes: Vec<_> = self
            .modules
            .iter()
            .flat_map(|(module, functions)| functions.keys().map(move |f| format!("{module}:{f}")))
            .collect();
        routes.sort();
        f.debug_struct("DynamicResolver")
            .field("routes", &routes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::into_handler;

    fn noop() -> BoxedHandler {
        into_handler(|| async {})
    }

    #[test]
    fn test_parse_splits_at_first_colon() {
        let route = RouteRef::parse("pkg.mod:handler").unwrap();
        assert_eq!(route.module, "pkg.mod");
        assert_eq!(route.function, "handler");

        let route = RouteRef::parse("pkg:fn:extra").unwrap();
        assert_eq!(route.module, "pkg");
        assert_eq!(route.function, "fn:extra");
        assert_eq!(route.to_string(), "pkg:fn:extra");
    }

    #[test]
    fn test_parse_rejects_malformed_payloads() {
        for payload in ["not-a-valid-format", ":fn", "pkg:", ":", ""] {
            assert!(
                matches!(
                    RouteRef::parse(payload),
                    Err(RouteError::MalformedPayload { .. })
                ),
                "{payload:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_resolve_distinguishes_failure_modes() {
        let mut resolver = DynamicResolver::new();
        resolver.register("pkg.mod", "handler", noop()).unwrap();

        assert!(resolver.resolve("pkg.mod:handler").is_ok());
        assert_eq!(
            resolver.resolve("pkg.mod:missing").err(),
            Some(RouteError::FunctionNotFound {
                module: "pkg.mod".into(),
                function: "missing".into(),
            })
        );
        assert_eq!(
            resolver.resolve("pkg.other:handler").err(),
            Some(RouteError::ModuleNotFound {
                module: "pkg.other".into(),
            })
        );
        assert!(matches!(
            resolver.resolve("nope"),
            Err(RouteError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn test_register_rejects_unparseable_routes() {
        let mut resolver = DynamicResolver::new();
        assert!(resolver.register("a:b", "c", noop()).is_err());
        assert!(resolver.register("", "c", noop()).is_err());
        assert!(resolver.register("a", "", noop()).is_err());
        assert!(resolver.is_empty());

        resolver.register("a", "b:c", noop()).unwrap();
        assert!(resolver.resolve("a:b:c").is_ok());
        assert_eq!(resolver.len(), 1);
    }
}
