use core::fmt;
use core::marker::PhantomData;

use serde_core::de::{Error, SeqAccess, Visitor};
use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use crate::SmallVec;

/// Upper bound on slots reserved from an untrusted size hint.
const MAX_PREALLOC: usize = 4096;

/// Written as a plain sequence; the region is not part of the format.
impl<T: Serialize, const N: usize> Serialize for SmallVec<T, N> {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.as_slice())
    }
}

struct ElementsVisitor<T, const N: usize>(PhantomData<T>);

impl<'de, T: Deserialize<'de>, const N: usize> Visitor<'de> for ElementsVisitor<T, N> {
    type Value = SmallVec<T, N>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a sequence of elements")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut vec = SmallVec::new();
        if let Some(hint) = seq.size_hint() {
            vec.try_reserve(hint.min(MAX_PREALLOC))
                .map_err(A::Error::custom)?;
        }
        while let Some(element) = seq.next_element()? {
            vec.try_push(element)
                .map_err(|(_, err)| A::Error::custom(err))?;
        }
        Ok(vec)
    }
}

/// Read from any sequence. Elements past `N` put the result on the heap, and
/// allocation failure becomes a deserializer error instead of an abort.
impl<'de, T: Deserialize<'de>, const N: usize> Deserialize<'de> for SmallVec<T, N> {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(ElementsVisitor(PhantomData))
    }
}
