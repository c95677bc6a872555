//! Weight rule parsing.
//!
//! Rule value format: space separated `<weightKey>:<awardId>,<awardId>,...`
//! groups, e.g. `4000:102,103 6000:102,103,104,105`.

/// One weight tier: a key and the award ids eligible under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightGroup {
    /// Tier key, e.g. `"4000"`.
    pub weight_key: String,
    /// Eligible award ids; never empty.
    pub eligible_award_ids: Vec<i32>,
}

/// A rule segment that could not be split into `key:id,id,...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedWeightRule {
    /// Raw segment text.
    pub segment: String,
    /// Why the segment was rejected.
    pub reason: &'static str,
}

/// Parsed groups plus rejected segments, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedWeightRule {
    /// Well-formed groups; a repeated key keeps the last occurrence.
    pub groups: Vec<WeightGroup>,
    /// Segments skipped during parsing.
    pub malformed: Vec<MalformedWeightRule>,
}

impl ParsedWeightRule {
    /// Look up a group by its weight key.
    #[must_use]
    pub fn group(&self, weight_key: &str) -> Option<&WeightGroup> {
        self.groups.iter().find(|g| g.weight_key == weight_key)
    }
}

/// Parse an encoded weight rule value.
#[must_use]
pub fn parse_weight_rule(rule_value: &str) -> ParsedWeightRule {
    let mut parsed = ParsedWeightRule::default();
    for segment in rule_value.split_whitespace() {
        match parse_segment(segment) {
            Ok(group) => {
                parsed.groups.retain(|g| g.weight_key != group.weight_key);
                parsed.groups.push(group);
            }
            Err(reason) => parsed.malformed.push(MalformedWeightRule {
                segment: segment.to_string(),
                reason,
            }),
        }
    }
    parsed
}

fn parse_segment(segment: &str) -> Result<WeightGroup, &'static str> {
    let (weight_key, ids) = segment
        .split_once(':')
        .ok_or("missing ':' between weight key and award ids")?;
    if ids.contains(':') {
        return Err("more than one ':' in segment");
    }
    let weight_key = weight_key.trim();
    if weight_key.is_empty() {
        return Err("empty weight key");
    }
    let eligible_award_ids = ids
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::parse::<i32>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| "award id is not an integer")?;
    if eligible_award_ids.is_empty() {
        return Err("no award ids");
    }
    Ok(WeightGroup {
        weight_key: weight_key.to_string(),
        eligible_award_ids,
    })
}
