/// Whether the caller has been greeted before.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserType {
    FirstTime,
    Known,
}

/// Formats a greeting line. An empty name becomes `unknown user`.
pub fn say_hello_to(name: &str, user_type: UserType) -> String {
    let name = if name.is_empty() { "unknown user" } else { name };

    match user_type {
        UserType::FirstTime => format!("Hello, {}!\n", name),
        UserType::Known => format!("Hi again, {}!\n", name),
    }
}
