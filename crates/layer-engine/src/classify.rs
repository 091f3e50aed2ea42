//! Mesh-name region classification.
//!
//! An ordered rule table evaluated first-match-wins against the lowercased
//! mesh name. Rules overlap on purpose; their order is the contract.

use studio_types::Region;

/// A predicate over a lowercased mesh name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Name contains the token.
    Contains(&'static str),
    /// Name ends with the token.
    EndsWith(&'static str),
    /// Name is exactly the token.
    Exact(&'static str),
    /// Name contains every token.
    AllOf(&'static [&'static str]),
    /// Name contains the token and none of the exclusions.
    ContainsWithout(&'static str, &'static [&'static str]),
}

impl Matcher {
    pub fn matches(&self, name: &str) -> bool {
        match *self {
            Matcher::Contains(token) => name.contains(token),
            Matcher::EndsWith(token) => name.ends_with(token),
            Matcher::Exact(token) => name == token,
            Matcher::AllOf(tokens) => tokens.iter().all(|t| name.contains(t)),
            Matcher::ContainsWithout(token, exclusions) => {
                name.contains(token) && !exclusions.iter().any(|e| name.contains(e))
            }
        }
    }
}

use Matcher::*;

/// The classification ladder, highest priority first.
pub const RULES: &[(Matcher, Region)] = &[
    // top / cap
    (Contains("top"), Region::Top),
    (Contains("cap"), Region::Top),
    (Contains("lid"), Region::Top),
    (Contains("cover"), Region::Top),
    (Contains("upper"), Region::Top),
    (Contains("head"), Region::Top),
    (Contains("cork"), Region::Top),
    (Contains("closure"), Region::Top),
    (Contains("stopper"), Region::Top),
    (Contains("jar_top"), Region::Top),
    (Contains("jartop"), Region::Top),
    (Contains("jar.top"), Region::Top),
    (Contains("glass_top"), Region::Top),
    (Contains("glasstop"), Region::Top),
    (AllOf(&["001", "jar"]), Region::Top),
    (Contains("_001"), Region::Top),
    (EndsWith("001"), Region::Top),
    (Contains("cylinder.001"), Region::Top),
    (Contains("sphere.001"), Region::Top),
    // middle / body
    (Contains("middle"), Region::Middle),
    (Contains("body"), Region::Middle),
    (Contains("main"), Region::Middle),
    (Contains("center"), Region::Middle),
    (Contains("container"), Region::Middle),
    (Contains("vessel"), Region::Middle),
    (Contains("inner"), Region::Middle),
    (Contains("interior"), Region::Middle),
    (Contains("jar_body"), Region::Middle),
    (Contains("jarbody"), Region::Middle),
    (Contains("jar.body"), Region::Middle),
    // base / bottom
    (Contains("base"), Region::Base),
    (Contains("bottom"), Region::Base),
    (Contains("foundation"), Region::Base),
    (Contains("foot"), Region::Base),
    (Contains("lower"), Region::Base),
    (Contains("floor"), Region::Base),
    (Contains("jar_base"), Region::Base),
    (Contains("jarbase"), Region::Base),
    (Contains("jar.base"), Region::Base),
    (Contains("glass_base"), Region::Base),
    (Contains("glassbase"), Region::Base),
    (AllOf(&["002", "jar"]), Region::Base),
    (Contains("_002"), Region::Base),
    (EndsWith("002"), Region::Base),
    (Contains("cylinder.002"), Region::Base),
    (Contains("sphere.002"), Region::Base),
    (Contains("cylinder_002"), Region::Base),
    (Contains("sphere_002"), Region::Base),
    (Contains("blkjar"), Region::Base),
    (Contains("blk_jar"), Region::Base),
    (Contains("blk-jar"), Region::Base),
    (Contains("glass"), Region::Base),
    (Contains("vessel"), Region::Base),
    (Contains("container"), Region::Base),
    (Exact("plane001"), Region::Base),
    (ContainsWithout("plane", &["_1"]), Region::Base),
    (Contains("pouch"), Region::Base),
    (Contains("bag"), Region::Base),
    (Contains("packet"), Region::Base),
    (ContainsWithout("jar", &["top", "cap", "lid"]), Region::Base),
    (ContainsWithout("mesh", &["top", "cap"]), Region::Base),
    (Exact("mesh"), Region::Base),
    (Exact("object"), Region::Base),
    (Exact("group"), Region::Base),
    (Exact("scene"), Region::Base),
    // artwork (pouch label area)
    (Exact("plane001_1"), Region::Artwork),
    (Contains("_1"), Region::Artwork),
    (Contains("artwork"), Region::Artwork),
    (Contains("logo_area"), Region::Artwork),
    (Contains("label"), Region::Artwork),
];

/// Classify a mesh name into exactly one region.
pub fn classify(mesh_name: &str) -> Region {
    let name = mesh_name.to_lowercase();
    RULES
        .iter()
        .find(|(matcher, _)| matcher.matches(&name))
        .map(|(_, region)| *region)
        .unwrap_or(Region::Unknown)
}

/// Index into [`RULES`] of the rule that decides `mesh_name`, if any.
pub fn matching_rule(mesh_name: &str) -> Option<usize> {
    let name = mesh_name.to_lowercase();
    RULES.iter().position(|(matcher, _)| matcher.matches(&name))
}
