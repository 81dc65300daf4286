// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Contains the definition of `QualifiedName`.

use std::fmt;

use crate::types::string::UAString;

crate::ua_struct! {
    /// An identifier for a name qualified by a namespace index. Written as its fields, the index
    /// followed by the name.
    #[derive(PartialEq, Eq, Debug, Clone, Hash, Default, Serialize, Deserialize)]
    pub struct QualifiedName {
        /// The namespace index.
        pub namespace_index: u16,
        /// The name.
        pub name: UAString,
    }
}

impl<'a> From<&'a str> for QualifiedName {
    fn from(value: &'a str) -> Self {
        Self {
            namespace_index: 0,
            name: UAString::from(value),
        }
    }
}

impl From<String> for QualifiedName {
    fn from(value: String) -> Self {
        Self {
            namespace_index: 0,
            name: UAString::from(value),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace_index > 0 {
            write!(f, "{}:{}", self.namespace_index, self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl QualifiedName {
    pub fn new<T>(namespace_index: u16, name: T) -> QualifiedName
    where
        T: Into<UAString>,
    {
        QualifiedName {
            namespace_index,
            name: name.into(),
        }
    }

    pub fn null() -> QualifiedName {
        QualifiedName {
            namespace_index: 0,
            name: UAString::null(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.namespace_index == 0 && self.name.is_null()
    }
}
