//! Symbol tables resolved from a loaded library.
//!
//! `symbol_table!` declares a struct with one `unsafe extern "C" fn` field
//! per entry point and a `resolve` constructor that looks each one up by
//! its field name. The pointers are copied out of their `Symbol` guards, so
//! a table must be stored next to the `Library` it came from and never
//! outlive it.

macro_rules! symbol_table {
    (
        $(#[$meta:meta])*
        $vis:vis struct $table:ident {
            $( fn $name:ident ( $($arg:ty),* $(,)? ) -> $ret:ty; )+
        }
    ) => {
        $(#[$meta])*
        #[allow(non_snake_case)]
        $vis struct $table {
            $( $name: unsafe extern "C" fn($($arg),*) -> $ret, )+
        }

        impl $table {
            /// Look up every entry point in `library`.
            ///
            /// # Safety
            ///
            /// The declared signatures must match the library's exports, and
            /// the table must be dropped before `library`.
            $vis unsafe fn resolve(
                library: &::libloading::Library,
                library_name: &str,
            ) -> $crate::error::Result<Self> {
                Ok(Self {
                    $(
                        $name: {
                            let symbol: ::libloading::Symbol<
                                '_,
                                unsafe extern "C" fn($($arg),*) -> $ret,
                            > = library
                                .get(concat!(stringify!($name), "\0").as_bytes())
                                .map_err(|_| {
                                    $crate::error::LoadError::symbol_not_found(
                                        library_name,
                                        stringify!($name),
                                    )
                                })?;
                            *symbol
                        },
                    )+
                })
            }
        }
    };
}
