use serde::{Deserialize, Serialize};

/// Connection target with credentials masked, safe to persist in run artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactedConnection {
    pub scheme: Option<String>,
    pub user: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub redacted: String,
}

/// Mask the password and sensitive query parameters of a connection URL.
pub fn redact_connection_string(conn: &str) -> RedactedConnection {
    let mut target = RedactedConnection {
        scheme: None,
        user: None,
        host: None,
        port: None,
        database: None,
        redacted: conn.to_string(),
    };

    let Some((scheme, rest)) = conn.split_once("://") else {
        return target;
    };
    target.scheme = Some(scheme.to_string());

    let (credentials, located) = match userinfo_end(rest) {
        Some(idx) => (Some(&rest[..idx]), &rest[idx + 1..]),
        None => (None, rest),
    };
    let (host_port, tail) = match located.find(['/', '?']) {
        Some(idx) => located.split_at(idx),
        None => (located, ""),
    };

    let mut masked_authority = String::new();
    if let Some(credentials) = credentials {
        match credentials.split_once(':') {
            Some((user, _password)) => {
                target.user = Some(user.to_string());
                masked_authority.push_str(&format!("{user}:***@"));
            }
            None => {
                target.user = Some(credentials.to_string());
                masked_authority.push_str(&format!("{credentials}@"));
            }
        }
    }
    masked_authority.push_str(host_port);

    match host_port.rsplit_once(':') {
        Some((host, port)) => {
            target.host = Some(host.to_string());
            target.port = port.parse().ok();
        }
        None if !host_port.is_empty() => target.host = Some(host_port.to_string()),
        None => {}
    }

    let (path, query) = match tail.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (tail, None),
    };
    let database = path.trim_start_matches('/');
    if !database.is_empty() {
        target.database = Some(database.to_string());
    }

    let mut redacted = format!("{scheme}://{masked_authority}{path}");
    if let Some(query) = query {
        redacted.push('?');
        redacted.push_str(&mask_query(query));
    }
    target.redacted = redacted;
    target
}

/// Position of the `@` that closes the user info.
///
/// Passwords may carry `/`, `?` or `@` unescaped, so the first `@` followed
/// by a non-empty host (up to the next `/` or `?`) without another `@` wins.
fn userinfo_end(rest: &str) -> Option<usize> {
    rest.match_indices('@').map(|(idx, _)| idx).find(|&idx| {
        let after = &rest[idx + 1..];
        let host = after.find(['/', '?']).map_or(after, |end| &after[..end]);
        !host.is_empty() && !host.contains('@')
    })
}

fn mask_query(query: &str) -> String {
    query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) if is_sensitive_key(key) => format!("{key}=***"),
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn is_sensitive_key(key: &str) -> bool {
    matches!(
        key.to_lowercase().as_str(),
        "password" | "pass" | "sslpassword" | "token"
    )
}
