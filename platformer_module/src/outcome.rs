use platformer_common::Rejection;
use spacetimedb::Identity;

/// Settle a reducer body whose validation may have declined the request.
///
/// Every check runs before the first write, so a rejection commits an empty
/// transaction. Callers see success either way; the reason goes to the log.
pub fn settle(reducer: &str, caller: Identity, result: Result<(), Rejection>) -> Result<(), String> {
    if let Err(rejection) = result {
        log::warn!("{} rejected for {}: {}", reducer, caller, rejection);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_settle_as_success() {
        let caller = Identity::ZERO;
        assert_eq!(settle("update_player_position", caller, Err(Rejection::PlayerDead)), Ok(()));
        assert_eq!(settle("respawn_player", caller, Ok(())), Ok(()));
    }
}
