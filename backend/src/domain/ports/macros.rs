//! Helper macro for generating domain port error enums.
//!
//! Every driven port declares a small `thiserror` enum whose variants carry
//! message fields. The macro also emits snake_case constructor helpers that
//! accept `impl Into<T>` for each field, so adapters can write
//! `StoreError::io("disk full")` instead of spelling the struct variant out.

macro_rules! define_port_error {
    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($( $field: impl Into<$ty> ),*) -> Self {
                Self::$variant { $( $field: $field.into() ),* }
            }
        }
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),* $(,)? } => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant { $($field : $ty),* },
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant { $($field : $ty),* });
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum ExamplePortError {
            Foo { message: String } => "foo: {message}",
            Baz { message: String, count: u32 } => "baz: {message} ({count})",
        }
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExamplePortError::foo("hello");
        assert_eq!(err.to_string(), "foo: hello");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExamplePortError::baz("hello", 42_u32);
        assert_eq!(err.to_string(), "baz: hello (42)");
    }
}
