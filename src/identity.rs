// Default application name: `<user>@<host>`.

/// Name of the current user, taken from the usual login environment
/// variables and then the password database.
pub fn user_name() -> String {
    ["LOGNAME", "USER", "LNAME", "USERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|name| !name.is_empty()))
        .or_else(passwd_name)
        .unwrap_or_else(|| "unknown".into())
}

#[cfg(unix)]
fn passwd_name() -> Option<String> {
    pwd::Passwd::current_user().map(|entry| entry.name)
}

#[cfg(not(unix))]
fn passwd_name() -> Option<String> {
    None
}

/// Host name of this machine, lossily converted to UTF-8.
pub fn host_name() -> String {
    match hostname::get() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(err) => {
            tracing::warn!(error = %err, "could not determine host name");
            "localhost".into()
        }
    }
}

/// The application name used when `--application` is not given.
pub fn default_application() -> String {
    format!("{}@{}", user_name(), host_name())
}
