/******************************************\
|==========================================|
|       Macro: impl_from_to_primitive      |
|==========================================|
\******************************************/

/// Generates index conversions for a fieldless `#[repr(u8)]` enum with a `NUM` constant.
///
/// It provides:
/// - `unsafe fn from_unchecked(index: u8) -> Self`: assumes the index names a variant.
/// - `fn from_index(index: u8) -> Option<Self>`: checked conversion.
/// - `const fn index(&self) -> usize`: the discriminant as a table index.
#[macro_export]
macro_rules! impl_from_to_primitive {
    ($enum_name:ident) => {
        impl $enum_name {
            #[doc=concat!("Converts primitive type u8 to ", stringify!($enum_name))]
            /// ## Safety
            /// - `index` must be smaller than `Self::NUM`
            #[inline]
            pub const unsafe fn from_unchecked(index: u8) -> Self {
                debug_assert!((index as usize) < Self::NUM, "Index out of bounds");
                unsafe { std::mem::transmute(index) }
            }

            #[doc=concat!("Converts primitive type u8 to ", stringify!($enum_name), ", or `None` when out of range")]
            #[inline]
            pub const fn from_index(index: u8) -> Option<Self> {
                if (index as usize) < Self::NUM {
                    Some(unsafe { Self::from_unchecked(index) })
                } else {
                    None
                }
            }

            #[doc=concat!("Converts ", stringify!($enum_name), " to primitive type usize")]
            #[inline]
            pub const fn index(&self) -> usize {
                *self as usize
            }
        }
    };
}

/******************************************\
|==========================================|
|          Macro: impl_enum_iter           |
|==========================================|
\******************************************/

/// Generates an `iter()` method over every variant, in discriminant order.
#[macro_export]
macro_rules! impl_enum_iter {
    ($enum_name:ident) => {
        impl $enum_name {
            #[doc=concat!("Returns iterator for all the elements in ", stringify!($enum_name))]
            pub fn iter() -> impl DoubleEndedIterator<Item = Self> + Clone {
                (0..Self::NUM as u8).map(|i| unsafe { Self::from_unchecked(i) })
            }
        }
    };
}

/******************************************\
|==========================================|
|           Macro: impl_bit_ops            |
|==========================================|
\******************************************/

/// Implements `&`, `|`, `^` and their assignment forms for a single-field
/// tuple struct against itself.
#[macro_export]
macro_rules! impl_bit_ops {
    ($struct_name:ident) => {
        $crate::impl_bit_ops!(@op $struct_name, BitAnd, bitand, BitAndAssign, bitand_assign, &);
        $crate::impl_bit_ops!(@op $struct_name, BitOr, bitor, BitOrAssign, bitor_assign, |);
        $crate::impl_bit_ops!(@op $struct_name, BitXor, bitxor, BitXorAssign, bitxor_assign, ^);
    };

    (@op $struct_name:ident, $op_name:ident, $method_name:ident, $assign_name:ident, $assign_method:ident, $op:tt) => {
        impl std::ops::$op_name for $struct_name {
            type Output = Self;

            #[inline]
            fn $method_name(self, rhs: Self) -> Self::Output {
                Self(self.0 $op rhs.0)
            }
        }

        impl std::ops::$assign_name for $struct_name {
            #[inline]
            fn $assign_method(&mut self, rhs: Self) {
                self.0 = self.0 $op rhs.0;
            }
        }
    };
}
