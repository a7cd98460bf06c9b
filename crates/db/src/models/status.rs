//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding lookup table created by the initial migration.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up the variant for a database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Enrollment lifecycle status. Completed and NotCompleted are terminal.
    UserChallengeStatus {
        CreateNew = 1,
        Completed = 2,
        NotCompleted = 3,
    }
}

define_status_enum! {
    /// Payment ledger status per order.
    PaymentStatus {
        Pending = 1,
        Settled = 2,
        Failed = 3,
    }
}

define_status_enum! {
    /// Product delivery status.
    DeliveryStatus {
        Pending = 1,
        Paid = 2,
        Cancelled = 3,
    }
}

define_status_enum! {
    /// What a discount code applies to.
    DiscountKind {
        Product = 1,
        Challenge = 2,
    }
}

define_status_enum! {
    /// Which gateway carried a payment.
    PaidType {
        Momo = 1,
        Alepay = 2,
    }
}
