/// Ordered degradation lattice: `none ≺ light ≺ moderate ≺ heavy ≺ critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DegradationLevel {
 None,
 Light,
 Moderate,
 Heavy,
 Critical,
}

impl DegradationLevel {
 /// Lattice join (least upper bound is just the larger of the two, since
 /// this lattice is a total order).
 pub fn max(self, other: Self) -> Self {
 std::cmp::max(self, other)
 }

 pub fn name(self) -> &'static str {
 match self {
 DegradationLevel::None => "none",
 DegradationLevel::Light => "light",
 DegradationLevel::Moderate => "moderate",
 DegradationLevel::Heavy => "heavy",
 DegradationLevel::Critical => "critical",
 }
 }
}
