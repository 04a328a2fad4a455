use super::*;
use yare::parameterized;

#[parameterized(
    pending_to_claimed = { SalvageState::Pending, SalvageState::Claimed, true },
    pending_to_dismissed = { SalvageState::Pending, SalvageState::Dismissed, true },
    claimed_to_done = { SalvageState::Claimed, SalvageState::Done, true },
    claimed_to_abandoned = { SalvageState::Claimed, SalvageState::Abandoned, true },
    pending_to_done = { SalvageState::Pending, SalvageState::Done, false },
    claimed_back_to_pending = { SalvageState::Claimed, SalvageState::Pending, false },
    done_is_terminal = { SalvageState::Done, SalvageState::Claimed, false },
    dismissed_is_terminal = { SalvageState::Dismissed, SalvageState::Claimed, false },
    abandoned_is_terminal = { SalvageState::Abandoned, SalvageState::Done, false },
    no_self_loop = { SalvageState::Pending, SalvageState::Pending, false },
)]
fn transitions(from: SalvageState, to: SalvageState, allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed, "{from} -> {to}");
}

#[test]
fn state_parse_round_trip() {
    for state in [
        SalvageState::Pending,
        SalvageState::Claimed,
        SalvageState::Done,
        SalvageState::Abandoned,
        SalvageState::Dismissed,
    ] {
        assert_eq!(SalvageState::parse(state.as_str()).unwrap(), state);
    }
    assert!(SalvageState::parse("revived").is_err());
}
