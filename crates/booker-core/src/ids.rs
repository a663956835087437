use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", &self.0.to_string()[..8])
            }
        }
    };
}

define_id!(
    /// Unique identifier for a wrestler.
    WrestlerId
);
define_id!(
    /// Unique identifier for a rivalry between two wrestlers.
    RivalryId
);
define_id!(
    /// Unique identifier for a championship title.
    TitleId
);
define_id!(
    /// Unique identifier for a wrestler's campaign.
    CampaignId
);
define_id!(
    /// Unique identifier for a show segment.
    SegmentId
);
define_id!(
    /// Unique identifier for a faction.
    FactionId
);
define_id!(
    /// Unique identifier for a non-player character such as a referee.
    NpcId
);
