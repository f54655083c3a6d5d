//! ---
//! chimera_section: "01-wire-codec"
//! chimera_subsection: "module"
//! chimera_type: "source"
//! chimera_scope: "code"
//! chimera_description: "Record codec, field tables and sample streams."
//! chimera_version: "v0.1.0"
//! chimera_owner: "telemetry"
//! ---
/// Declare a record type from its field table.
///
/// Generates the struct, its [`Schema`](crate::Schema), typed
/// get/set/has/clear accessors per field, and the [`Record`](crate::Record),
/// `Default` and `Display` impls. Tags must be listed in ascending order.
///
/// ```
/// chimera_wire::define_record! {
///     /// Wheel speed sample.
///     pub struct WheelSample = "devices.Wheel" {
///         /// Seconds since boot.
///         1 => timestamp: f32 {
///             json: "timestamp",
///             set: set_timestamp,
///             has: has_timestamp,
///             clear: clear_timestamp,
///         },
///         2 => rpm: f32 {
///             json: "rpm",
///             set: set_rpm,
///             has: has_rpm,
///             clear: clear_rpm,
///         },
///     }
/// }
///
/// use chimera_wire::Record;
///
/// let mut sample = WheelSample::new();
/// sample.set_rpm(0.0);
/// assert!(sample.has_rpm());
/// assert_eq!(sample.encode_to_vec().len(), 5);
/// ```
#[macro_export]
macro_rules! define_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident = $schema:literal {
            $(
                $(#[$field_meta:meta])*
                $tag:literal => $field:ident: $ty:ty {
                    json: $json:literal,
                    set: $setter:ident,
                    has: $has:ident,
                    clear: $clear:ident $(,)?
                }
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis struct $name {
            fields: $crate::FieldSet,
        }

        impl $name {
            const FIELDS: &'static [$crate::FieldDescriptor] = &[
                $(
                    $crate::FieldDescriptor::new(
                        $tag,
                        stringify!($field),
                        $json,
                        <$ty as $crate::Scalar>::TYPE,
                    ),
                )*
            ];

            /// Record with every field absent.
            pub fn new() -> Self {
                <Self as $crate::Record>::empty()
            }

            $(
                $(#[$field_meta])*
                pub fn $field(&self) -> $ty {
                    self.fields.get::<$ty>($tag)
                }

                #[doc = concat!("Set `", stringify!($field), "` and mark it present.")]
                pub fn $setter(&mut self, value: $ty) -> &mut Self {
                    self.fields.put::<$ty>($tag, value);
                    self
                }

                #[doc = concat!("True iff `", stringify!($field), "` is present.")]
                pub fn $has(&self) -> bool {
                    self.fields.has($tag)
                }

                #[doc = concat!("Mark `", stringify!($field), "` absent.")]
                pub fn $clear(&mut self) -> &mut Self {
                    self.fields.remove($tag);
                    self
                }
            )*
        }

        impl ::std::default::Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::Record for $name {
            fn schema() -> &'static $crate::Schema {
                static SCHEMA: $crate::Schema = $crate::Schema::new($schema, $name::FIELDS);
                &SCHEMA
            }

            fn from_fields(fields: $crate::FieldSet) -> Self {
                Self { fields }
            }

            fn fields(&self) -> &$crate::FieldSet {
                &self.fields
            }

            fn fields_mut(&mut self) -> &mut $crate::FieldSet {
                &mut self.fields
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&$crate::render::to_text(&self.fields))
            }
        }
    };
}
