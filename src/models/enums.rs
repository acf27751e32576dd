use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// Serde names follow the wire/database strings (kebab-case).
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(UserRole {
    Admin => "admin",
    Sender => "sender",
    Reviewer => "reviewer",
    Observer => "observer",
});

str_enum!(DocumentStatus {
    Pending => "pending",
    InReview => "in-review",
    Referred => "referred",
    Completed => "completed",
});

impl DocumentStatus {
    /// Human-readable label, as the routing screens render it.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InReview => "In Review",
            Self::Referred => "Referred",
            Self::Completed => "Completed",
        }
    }
}

str_enum!(ActivityKind {
    Upload => "upload",
    Referral => "referral",
    Comment => "comment",
    StatusChange => "status-change",
});
