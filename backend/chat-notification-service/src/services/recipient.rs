/// Recipient resolution for two-party conversations
use crate::models::CONVERSATION_ID_SEPARATOR;

/// Pick the participant of `conversation_id` who is not the sender.
///
/// Participants are found by exclusion: the first part that differs from
/// `sender_id` wins, whatever its position. The id is not checked for having
/// exactly two parts, and a sender that is not a participant resolves to the
/// first part. An absent sender id matches no part. Returns `None` when every
/// part is the sender or the chosen part is empty.
pub fn resolve_recipient<'a>(conversation_id: &'a str, sender_id: Option<&str>) -> Option<&'a str> {
    conversation_id
        .split(CONVERSATION_ID_SEPARATOR)
        .find(|participant| Some(*participant) != sender_id)
        .filter(|participant| !participant.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_other_participant_either_order() {
        assert_eq!(resolve_recipient("u1_u2", Some("u1")), Some("u2"));
        assert_eq!(resolve_recipient("u1_u2", Some("u2")), Some("u1"));
    }

    #[test]
    fn test_non_participant_sender_gets_first_part() {
        assert_eq!(resolve_recipient("u1_u2", Some("u3")), Some("u1"));
    }

    #[test]
    fn test_absent_sender_gets_first_part() {
        assert_eq!(resolve_recipient("u1_u2", None), Some("u1"));
    }

    #[test]
    fn test_more_than_two_parts_first_non_matching_wins() {
        assert_eq!(resolve_recipient("u1_u2_u3", Some("u1")), Some("u2"));
        assert_eq!(resolve_recipient("u1_u1_u3", Some("u1")), Some("u3"));
    }

    #[test]
    fn test_no_recipient() {
        assert_eq!(resolve_recipient("u1", Some("u1")), None);
        assert_eq!(resolve_recipient("u1_u1", Some("u1")), None);
    }

    #[test]
    fn test_empty_part_is_no_recipient() {
        // The first non-matching part is empty, so the later "u3" is never considered
        assert_eq!(resolve_recipient("u1__u3", Some("u1")), None);
        assert_eq!(resolve_recipient("_u2", Some("u2")), None);
        assert_eq!(resolve_recipient("", Some("u1")), None);
    }
}
