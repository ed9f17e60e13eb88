use kaiwa_types::Message;

/// Provider-specific conversation preprocessing, applied in order before the
/// codec filters and encodes the messages.
pub trait MessageTransformer: Send + Sync {
    fn transform(&self, messages: Vec<Message>) -> Vec<Message>;
}

impl<F> MessageTransformer for F
where
    F: Fn(Vec<Message>) -> Vec<Message> + Send + Sync,
{
    fn transform(&self, messages: Vec<Message>) -> Vec<Message> {
        self(messages)
    }
}

pub fn apply_transformers(
    messages: Vec<Message>,
    transformers: &[Box<dyn MessageTransformer>],
) -> Vec<Message> {
    transformers
        .iter()
        .fold(messages, |acc, transformer| transformer.transform(acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kaiwa_types::MessageRole;

    #[test]
    fn transformers_apply_in_order() {
        let push_a: Box<dyn MessageTransformer> = Box::new(|mut messages: Vec<Message>| {
            messages.push(Message::text(MessageRole::User, "a"));
            messages
        });
        let push_b: Box<dyn MessageTransformer> = Box::new(|mut messages: Vec<Message>| {
            messages.push(Message::text(MessageRole::User, "b"));
            messages
        });

        let result = apply_transformers(Vec::new(), &[push_a, push_b]);
        let texts: Vec<_> = result.iter().filter_map(|m| m.text_content()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn no_transformers_is_identity() {
        let messages = vec![Message::text(MessageRole::User, "hi")];
        let result = apply_transformers(messages.clone(), &[]);
        assert_eq!(result, messages);
    }
}
