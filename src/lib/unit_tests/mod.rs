// SPDX-License-Identifier: Apache-2.0

mod net_env;
mod net_iso;
mod testlib;
mod topology;
mod validate;
