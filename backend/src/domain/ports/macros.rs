//! `define_port_error!` builds a `thiserror` enum for an outbound port plus
//! one snake_case constructor per variant.
//!
//! Constructor parameters take `impl Into<T>` so call sites can pass `&str`
//! for `String` fields.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@constructor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };

    (@constructor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@constructor $variant:ident { $($field:ident : $ty:ty),* }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($field: impl Into<$ty>),*) -> Self {
                Self::$variant { $($field: $field.into()),* }
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        pub enum SamplePortError {
            Offline => "offline",
            Refused { message: String } => "refused: {message}",
            Throttled { retry_after_secs: u64, message: String } => "throttled for {retry_after_secs}s: {message}",
        }
    }

    #[test]
    fn unit_variant_constructor() {
        assert_eq!(SamplePortError::offline(), SamplePortError::Offline);
    }

    #[test]
    fn string_fields_accept_str() {
        assert_eq!(SamplePortError::refused("no").to_string(), "refused: no");
    }

    #[test]
    fn mixed_fields_keep_their_types() {
        let err = SamplePortError::throttled(30_u64, "slow down");
        assert_eq!(err.to_string(), "throttled for 30s: slow down");
    }
}
