/// Supplies a bearer token for one request. Called every time a request is
/// about to be sent; `None` or an empty token means "don't send".
pub trait CredentialSource {
    fn bearer_token(&self) -> Option<String>;
}

impl<F> CredentialSource for F
where
    F: Fn() -> Option<String>,
{
    fn bearer_token(&self) -> Option<String> {
        self()
    }
}

/// Reads the token from an environment variable on each call, so a host
/// process can rotate it underneath the viewer.
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvToken {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn closures_are_asked_every_time() {
        let calls = Cell::new(0);
        let source = || {
            calls.set(calls.get() + 1);
            Some(format!("token-{}", calls.get()))
        };
        assert_eq!(source.bearer_token().as_deref(), Some("token-1"));
        assert_eq!(source.bearer_token().as_deref(), Some("token-2"));
    }

    #[test]
    fn unset_env_token_is_none() {
        let source = EnvToken::new("IMPACTGRAPH_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert_eq!(source.bearer_token(), None);
    }
}
