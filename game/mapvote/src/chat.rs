/// A chat line understood by the vote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteCmd {
    /// numeric ballot for the given 1-based choice
    Vote(i64),
    Choices,
    Results,
    Start(Vec<String>),
    Restart(Vec<String>),
    Cancel,
    Broadcast,
    Help,
    Unknown(String),
}

/// Interprets a raw chat line.
///
/// A bare number always counts as a ballot, everything else must carry
/// the command prefix. `None` means the line is not vote traffic and
/// must be ignored without a reply.
pub fn parse_chat(prefix: &str, raw: &str) -> Option<VoteCmd> {
    let msg = raw.trim().to_ascii_lowercase();
    let prefix = prefix.to_ascii_lowercase();

    let body = if let Some(rest) = msg.strip_prefix(&prefix) {
        rest.trim()
    } else if msg.parse::<i64>().is_ok() {
        msg.as_str()
    } else {
        return None;
    };

    let mut parts = body.split_whitespace();
    let sub = parts.next().unwrap_or("");
    if let Ok(number) = sub.parse::<i64>() {
        return Some(VoteCmd::Vote(number));
    }
    let args: Vec<String> = parts.map(str::to_string).collect();

    Some(match sub {
        "choices" => VoteCmd::Choices,
        "results" => VoteCmd::Results,
        "start" => VoteCmd::Start(args),
        "restart" => VoteCmd::Restart(args),
        "cancel" => VoteCmd::Cancel,
        "broadcast" => VoteCmd::Broadcast,
        "help" => VoteCmd::Help,
        other => VoteCmd::Unknown(other.to_string()),
    })
}
