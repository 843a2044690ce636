use std::fmt;
use std::str::FromStr;

use lgbm_core::Handle;
use lgbm_engine::DType;

use crate::error::BridgeError;

macro_rules! typed_handle {
    ($name:ident, $kind:literal) => {
        #[doc = concat!("Registry handle for a ", $kind, ".")]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) Handle);

        impl $name {
            pub fn handle(self) -> Handle {
                self.0
            }

            /// Packed form used across the C ABI.
            pub fn to_raw(self) -> u64 {
                self.0.to_raw()
            }

            /// `None` for `0` or any value that cannot be a live handle.
            pub fn from_raw(raw: u64) -> Option<Self> {
                Handle::from_raw(raw).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($kind, " {}"), self.0)
            }
        }
    };
}

typed_handle!(DatasetHandle, "dataset");
typed_handle!(BoosterHandle, "booster");

/// Booster restored from a model file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedBooster {
    pub handle: BoosterHandle,
    /// Boosting rounds stored in the model
    pub num_iterations: i64,
}

/// Dataset metadata fields the engine accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Label,
    Weight,
    /// Query sizes for ranking
    Group,
    GroupId,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Label, Field::Weight, Field::Group, Field::GroupId];

    pub fn name(self) -> &'static str {
        match self {
            Field::Label => "label",
            Field::Weight => "weight",
            Field::Group => "group",
            Field::GroupId => "group_id",
        }
    }

    pub(crate) fn c_name(self) -> &'static std::ffi::CStr {
        match self {
            Field::Label => c"label",
            Field::Weight => c"weight",
            Field::Group => c"group",
            Field::GroupId => c"group_id",
        }
    }

    /// Element type the engine stores this field as.
    pub fn dtype(self) -> DType {
        match self {
            Field::Label | Field::Weight => DType::Float32,
            Field::Group | Field::GroupId => DType::Int32,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| BridgeError::UnknownField(s.to_string()))
    }
}
