/// Creates a single [`Message`](crate::Message) from a role shorthand.
///
/// ```rust
/// use spindle::{MessageContent, Role, sp_msg};
///
/// let message = sp_msg!(assistant => "Done.");
/// assert_eq!(message.role, Role::Assistant);
/// assert_eq!(message.content, MessageContent::from("Done."));
/// ```
#[macro_export]
macro_rules! sp_msg {
    (system => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::System, $content)
    };
    (user => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::User, $content)
    };
    (assistant => $content:expr $(,)?) => {
        $crate::Message::new($crate::Role::Assistant, $content)
    };
    ($role:ident => $content:expr $(,)?) => {
        compile_error!("unsupported role: use system, user, or assistant");
    };
}

/// Creates a `Vec<Message>` from role/content pairs.
///
/// ```rust
/// use spindle::{Role, sp_messages};
///
/// let messages = sp_messages![
///     system => "You are concise.",
///     user => "What's the weather in Oslo?",
/// ];
///
/// assert_eq!(messages.len(), 2);
/// assert_eq!(messages[0].role, Role::System);
/// assert_eq!(messages[1].role, Role::User);
/// ```
#[macro_export]
macro_rules! sp_messages {
    () => {
        Vec::<$crate::Message>::new()
    };
    ($($role:ident => $content:expr),+ $(,)?) => {
        vec![$($crate::sp_msg!($role => $content)),+]
    };
}
