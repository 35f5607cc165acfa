macro_rules! nutype_string {
    ($ident:ident($($args:tt)*)) => {
        #[::nutype::nutype(
            $($args)*,
            derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref),
        )]
        pub struct $ident(String);
    };
}

pub(crate) use nutype_string;
