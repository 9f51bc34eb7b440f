// SPDX-License-Identifier: Apache-2.0

use serde::Serializer;

use crate::device::MTU_UNSET;

pub(crate) fn mtu_or_unset<S>(
    mtu: &Option<u32>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match mtu {
        Some(m) => serializer.serialize_i64(i64::from(*m)),
        None => serializer.serialize_i64(MTU_UNSET),
    }
}
