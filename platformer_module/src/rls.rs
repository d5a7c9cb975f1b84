// Row Level Security (RLS) restricts which rows of a public table each client
// can see. Filters may only reference a single table and `:sender`; no joins.
//
// NOTE: requires the "unstable" feature:
//      spacetimedb = { version = "...", features = ["unstable"] }

#[cfg(feature = "unstable")]
use spacetimedb::{client_visibility_filter, Filter};

/// Cooldown timestamps are private to their owner
#[cfg(feature = "unstable")]
#[client_visibility_filter]
const PLAYER_COOLDOWN_VISIBILITY: Filter = Filter::Sql("
    SELECT * FROM player_cooldown WHERE player_id = :sender
");

/// Hits taken are only streamed to the victim
#[cfg(feature = "unstable")]
#[client_visibility_filter]
const PLAYER_DAMAGE_EVENT_VISIBILITY: Filter = Filter::Sql("
    SELECT * FROM player_damage_event WHERE player_id = :sender
");
