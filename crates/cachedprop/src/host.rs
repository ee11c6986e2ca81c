//! Binding between a cache and the object that owns it

/// A host object that exposes invalidation keys by field name
///
/// A cache reads `invalidation_key(field)` on every lookup. Returning
/// `None` means the host has no such field, which the cache reports as
/// [`Error::MissingInvalidationField`](crate::Error::MissingInvalidationField).
///
/// Keys are compared with `==`, so floats work. Unbounded history needs
/// `Hash + Eq` keys and the `*_hashed` cache constructors.
pub trait InvalidationSource {
    /// Value type compared between lookups
    type Key: PartialEq + Clone;

    /// Read the current value of `field`
    fn invalidation_key(&self, field: &str) -> Option<Self::Key>;
}

/// Implement [`InvalidationSource`] over plain struct fields.
///
/// Every listed field must have the same type, which becomes the key type.
/// Names not listed resolve to `None`.
///
/// ```
/// use cachedprop::{invalidation_fields, InvalidationSource};
///
/// struct Doc {
///     revision: u64,
///     generation: u64,
/// }
///
/// invalidation_fields!(Doc => u64 { revision, generation });
///
/// let doc = Doc { revision: 3, generation: 9 };
/// assert_eq!(doc.invalidation_key("revision"), Some(3));
/// assert_eq!(doc.invalidation_key("title"), None);
/// ```
#[macro_export]
macro_rules! invalidation_fields {
    ($host:ty => $key:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::InvalidationSource for $host {
            type Key = $key;

            fn invalidation_key(&self, field: &str) -> ::std::option::Option<$key> {
                match field {
                    $(stringify!($field) => ::std::option::Option::Some(
                        ::std::clone::Clone::clone(&self.$field),
                    ),)+
                    _ => ::std::option::Option::None,
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::InvalidationSource;

    #[derive(Debug)]
    struct Tagged {
        tag: String,
        alt: String,
    }

    invalidation_fields!(Tagged => String { tag, alt, });

    #[test]
    fn test_macro_reads_fields() {
        let host = Tagged {
            tag: "v1".to_string(),
            alt: "beta".to_string(),
        };
        assert_eq!(host.invalidation_key("tag").as_deref(), Some("v1"));
        assert_eq!(host.invalidation_key("alt").as_deref(), Some("beta"));
        assert_eq!(host.invalidation_key("missing"), None);
    }
}
