// Copyright 2020 Google Inc. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Newtypes for [indices](https://webassembly.github.io/spec/core/binary/modules.html#indices).
//!
//! Each index kind wraps a plain `u32` but is its own distinct type, so that
//! passing a [`FunctionIndex`] where a [`TypeIndex`] is expected is a
//! compile-time error rather than a silently-accepted mismatch.

use crate::error::{DecodeError, Result};
use crate::io::{decode_u32, reclassify_eof, ByteSource};
use std::fmt;

macro_rules! index_type {
    ($name:ident) => {
        #[derive(PartialEq, Eq, Clone, Copy, Hash)]
        pub struct $name(pub u32);

        impl $name {
            pub(crate) fn decode(src: &mut dyn ByteSource) -> Result<Self> {
                decode_u32(src)
                    .map(Self)
                    .map_err(|err| reclassify_eof(src, err, DecodeError::ExpectedIndex))
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self(index)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> u32 {
                id.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

index_type!(TypeIndex);
index_type!(FunctionIndex);
index_type!(TableIndex);
index_type!(MemoryIndex);
index_type!(GlobalIndex);
index_type!(LocalIndex);
index_type!(LabelIndex);
index_type!(DataIndex);
index_type!(ElemIndex);
