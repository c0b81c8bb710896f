//! Shared test harness modules for the Ecoroute CLI.

use super::*;

mod helpers;
