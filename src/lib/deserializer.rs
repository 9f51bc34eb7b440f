// SPDX-License-Identifier: Apache-2.0

use std::convert::TryFrom;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::{de, de::Visitor, Deserializer};

use crate::device::MTU_UNSET;

// This function is inspired by https://serde.rs/string-or-struct.html
pub(crate) fn option_u16_or_string<'de, D>(
    deserializer: D,
) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    struct IntegerOrString(PhantomData<fn() -> Option<u16>>);

    impl<'de> Visitor<'de> for IntegerOrString {
        type Value = Option<u16>;

        fn expecting(
            &self,
            formatter: &mut std::fmt::Formatter,
        ) -> std::fmt::Result {
            formatter.write_str("integer, string or null")
        }

        fn visit_str<E>(self, value: &str) -> Result<Option<u16>, E>
        where
            E: de::Error,
        {
            if value.is_empty() {
                Ok(None)
            } else {
                FromStr::from_str(value)
                    .map_err(de::Error::custom)
                    .map(Some)
            }
        }

        fn visit_u64<E>(self, value: u64) -> Result<Option<u16>, E>
        where
            E: de::Error,
        {
            TryFrom::try_from(value)
                .map_err(de::Error::custom)
                .map(Some)
        }

        fn visit_unit<E>(self) -> Result<Option<u16>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Option<u16>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(IntegerOrString(PhantomData))
}

pub(crate) fn u16_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    option_u16_or_string(deserializer)?
        .ok_or_else(|| de::Error::custom("VLAN ID should not be empty"))
}

/// MTU is persisted as integer with `-1` standing for "not set". Older
/// settings files stored it as string.
pub(crate) fn mtu_or_unset<'de, D>(
    deserializer: D,
) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    struct MtuOrUnset(PhantomData<fn() -> Option<u32>>);

    impl<'de> Visitor<'de> for MtuOrUnset {
        type Value = Option<u32>;

        fn expecting(
            &self,
            formatter: &mut std::fmt::Formatter,
        ) -> std::fmt::Result {
            formatter.write_str("positive integer or -1")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Option<u32>, E>
        where
            E: de::Error,
        {
            if value == MTU_UNSET {
                Ok(None)
            } else {
                TryFrom::try_from(value)
                    .map_err(de::Error::custom)
                    .map(Some)
            }
        }

        fn visit_u64<E>(self, value: u64) -> Result<Option<u32>, E>
        where
            E: de::Error,
        {
            TryFrom::try_from(value)
                .map_err(de::Error::custom)
                .map(Some)
        }

        fn visit_str<E>(self, value: &str) -> Result<Option<u32>, E>
        where
            E: de::Error,
        {
            let value = value.trim();
            if value.is_empty() {
                return Ok(None);
            }
            let mtu = i64::from_str(value).map_err(de::Error::custom)?;
            self.visit_i64(mtu)
        }

        fn visit_unit<E>(self) -> Result<Option<u32>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Option<u32>, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(MtuOrUnset(PhantomData))
}
