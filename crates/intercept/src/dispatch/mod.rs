//! Lookup from operation name to the interceptor installed in its place.

mod sites;

use tracing::debug;

use crate::callsite::{CallSite, CallSiteGroup};
use crate::tap::InputTap;

use self::sites::{
    BooleanPropertyCallSite, EnvCallSite, ExecCallSite, ExecuteCallSite, IntegerPropertyCallSite,
    LongPropertyCallSite, ProcessStartCallSite, PropertiesCallSite, PropertyCallSite,
};

/// The closed set of recognized operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    GetProperty,
    Properties,
    GetInteger,
    GetLong,
    GetBoolean,
    Getenv,
    Exec,
    Execute,
    Start,
    StartPipeline,
}

/// Decides, per generated call site, whether an interceptor replaces the
/// original site. Populated once; immutable afterwards.
pub struct DispatchTable {
    tap: InputTap,
}

impl DispatchTable {
    pub fn new(tap: InputTap) -> Self {
        Self { tap }
    }

    /// Pure lookup consumed by the host's call-rewriting step. Operation
    /// names outside the closed set resolve to `None`; those call sites
    /// keep their normal dispatch, which is not an error, since most of a
    /// program's operations are never tracked.
    pub fn resolve(&self, operation: &str) -> Option<Interception> {
        Some(match operation {
            "get_property" => Interception::GetProperty,
            "properties" => Interception::Properties,
            "get_integer" => Interception::GetInteger,
            "get_long" => Interception::GetLong,
            "get_boolean" => Interception::GetBoolean,
            "getenv" => Interception::Getenv,
            "exec" => Interception::Exec,
            "execute" => Interception::Execute,
            "start" => Interception::Start,
            "start_pipeline" => Interception::StartPipeline,
            _ => return None,
        })
    }

    /// Rewrites a generated call-site group in place, installing an
    /// interceptor for every recognized operation and leaving the rest
    /// untouched. Accesses made through the group are attributed to its
    /// owner.
    pub fn decorate_call_sites(&self, group: &mut CallSiteGroup) {
        let sites = std::mem::take(&mut group.sites);
        group.sites = sites
            .into_iter()
            .map(|site| self.decorate(site, &group.owner))
            .collect();
    }

    /// Decorates a single call site; unrecognized operations come back
    /// unchanged.
    pub fn decorate(&self, site: Box<dyn CallSite>, owner: &str) -> Box<dyn CallSite> {
        let kind = match self.resolve(site.operation()) {
            Some(kind) => kind,
            None => return site,
        };
        debug!(
            operation = site.operation(),
            owner, "installing interceptor call site"
        );
        let tap = self.tap.clone();
        match kind {
            Interception::GetProperty => Box::new(PropertyCallSite::new(site, tap, owner)),
            Interception::Properties => Box::new(PropertiesCallSite::new(site, tap, owner)),
            Interception::GetInteger => Box::new(IntegerPropertyCallSite::new(site, tap, owner)),
            Interception::GetLong => Box::new(LongPropertyCallSite::new(site, tap, owner)),
            Interception::GetBoolean => Box::new(BooleanPropertyCallSite::new(site, tap, owner)),
            Interception::Getenv => Box::new(EnvCallSite::new(site, tap, owner)),
            Interception::Exec => Box::new(ExecCallSite::new(site, tap, owner)),
            Interception::Execute => Box::new(ExecuteCallSite::new(site, tap, owner)),
            Interception::Start | Interception::StartPipeline => {
                Box::new(ProcessStartCallSite::new(site, tap, owner))
            }
        }
    }
}
