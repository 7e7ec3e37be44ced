// ==========================================
// 船板质保书校验系统 - 细化元素策略组合判定
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - PART E 细化元素策略
// 依据: CCS《材料与焊接规范》第1篇第3章 - 细化晶粒元素
// ==========================================
// 职责: 策略组(合取)与策略组集(析取)的判定与回写
// 红线: 策略组试算无副作用,只有组集负责回写元素判定
// 红线: 组集按声明顺序判定,首个通过的组短路,回写范围可观察
// ==========================================

use crate::domain::measurement::Checkable;
use crate::domain::plate::Plate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ElementBound - 策略内单元素界限
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementBound {
    pub symbol: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ElementBound {
    pub fn min(symbol: &str, min: f64) -> Self {
        assert!(min.is_finite(), "规则表配置错误: ElementBound 下限非有限值");
        Self {
            symbol: symbol.to_string(),
            min: Some(min),
            max: None,
        }
    }

    pub fn range(symbol: &str, min: f64, max: f64) -> Self {
        assert!(
            min.is_finite() && max.is_finite() && min <= max,
            "规则表配置错误: ElementBound 区间缺失或下限大于上限"
        );
        Self {
            symbol: symbol.to_string(),
            min: Some(min),
            max: Some(max),
        }
    }

    /// 本元素自身的界限判定
    ///
    /// # 规则
    /// - 换算值缺失(元素未报出) → 不通过
    /// - 双侧含边界
    fn check(&self, derived: Option<f64>) -> (bool, String) {
        let value = match derived {
            Some(v) => v,
            None => return (false, format!("FAIL: {} 未报出", self.symbol)),
        };

        if let Some(min) = self.min {
            if value < min {
                return (false, format!("FAIL: {} {} 低于下限 {}", self.symbol, value, min));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return (false, format!("FAIL: {} {} 超上限 {}", self.symbol, value, max));
            }
        }
        (true, format!("PASS: {} {} 合格", self.symbol, value))
    }
}

// ==========================================
// GroupMember - 策略组成员
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupMember {
    /// 单元素界限
    Single(ElementBound),
    /// 成对替代(如酸溶铝/全铝,任一满足即整对放行)
    Paired {
        primary: ElementBound,
        alternate: ElementBound,
    },
    /// 多元素合计上限(如 Nb+V+Ti 总量)
    SumCeiling { symbols: Vec<String>, max: f64 },
}

impl GroupMember {
    pub fn paired(primary: ElementBound, alternate: ElementBound) -> Self {
        assert!(
            primary.symbol != alternate.symbol,
            "规则表配置错误: 成对替代引用同一元素"
        );
        GroupMember::Paired { primary, alternate }
    }

    pub fn sum_ceiling(symbols: &[&str], max: f64) -> Self {
        assert!(
            symbols.len() >= 2 && max.is_finite(),
            "规则表配置错误: SumCeiling 需至少两个元素且界限有限"
        );
        GroupMember::SumCeiling {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            max,
        }
    }

    /// 成员引用到的元素符号
    fn referenced(&self) -> Vec<String> {
        match self {
            GroupMember::Single(bound) => vec![bound.symbol.clone()],
            GroupMember::Paired { primary, alternate } => {
                vec![primary.symbol.clone(), alternate.symbol.clone()]
            }
            GroupMember::SumCeiling { symbols, .. } => symbols.clone(),
        }
    }

    /// 试算(只读),产出组内通过与否 + 待回写内容
    fn evaluate(&self, plate: &Plate) -> MemberOutcome {
        match self {
            GroupMember::Single(bound) => {
                let derived = plate.element(&bound.symbol).and_then(|e| e.derived);
                let (pass, message) = bound.check(derived);
                MemberOutcome {
                    passed: pass,
                    writes: vec![PendingWrite {
                        symbol: bound.symbol.clone(),
                        message: message.clone(),
                    }],
                    fail_fragments: if pass { Vec::new() } else { vec![message] },
                }
            }
            GroupMember::Paired { primary, alternate } => {
                let primary_derived = plate.element(&primary.symbol).and_then(|e| e.derived);
                let alternate_derived = plate.element(&alternate.symbol).and_then(|e| e.derived);
                let (primary_pass, primary_msg) = primary.check(primary_derived);
                let (alternate_pass, alternate_msg) = alternate.check(alternate_derived);

                // 任一满足即整对放行;两条消息都带上,便于追溯哪一侧放行
                let passed = primary_pass || alternate_pass;
                let combined = if primary_pass && alternate_pass {
                    format!("{}; {}", primary_msg, alternate_msg)
                } else if passed {
                    let carrier = if primary_pass {
                        &primary.symbol
                    } else {
                        &alternate.symbol
                    };
                    format!("{}; {} (成对替代: 以 {} 满足)", primary_msg, alternate_msg, carrier)
                } else {
                    format!("{}; {}", primary_msg, alternate_msg)
                };

                MemberOutcome {
                    passed,
                    writes: vec![
                        PendingWrite {
                            symbol: primary.symbol.clone(),
                            message: combined.clone(),
                        },
                        PendingWrite {
                            symbol: alternate.symbol.clone(),
                            message: combined.clone(),
                        },
                    ],
                    fail_fragments: if passed { Vec::new() } else { vec![combined] },
                }
            }
            GroupMember::SumCeiling { symbols, max } => {
                let mut total = 0.0;
                let mut missing = Vec::new();
                for symbol in symbols {
                    match plate.element(symbol).and_then(|e| e.derived) {
                        Some(v) => total += v,
                        None => missing.push(symbol.as_str()),
                    }
                }

                // 合计量按已报出元素计;全部缺失视为不满足
                let (passed, message) = if missing.len() == symbols.len() {
                    (false, format!("FAIL: {} 均未报出", symbols.join("+")))
                } else if total <= *max {
                    (
                        true,
                        format!("PASS: {} 合计 {:.3} <= {:.3}", symbols.join("+"), total, max),
                    )
                } else {
                    (
                        false,
                        format!("FAIL: {} 合计 {:.3} 超上限 {:.3}", symbols.join("+"), total, max),
                    )
                };

                MemberOutcome {
                    passed,
                    writes: symbols
                        .iter()
                        .map(|s| PendingWrite {
                            symbol: s.clone(),
                            message: message.clone(),
                        })
                        .collect(),
                    fail_fragments: if passed { Vec::new() } else { vec![message] },
                }
            }
        }
    }
}

/// 待回写条目(组集胜出后统一落盘)
#[derive(Debug, Clone)]
struct PendingWrite {
    symbol: String,
    message: String,
}

/// 成员试算结果
struct MemberOutcome {
    passed: bool,
    writes: Vec<PendingWrite>,
    fail_fragments: Vec<String>,
}

// ==========================================
// ConjunctiveGroup - 策略组(全员满足)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConjunctiveGroup {
    pub name: String, // 策略名(如 AL / AL+NB+TI),进诊断消息
    pub members: Vec<GroupMember>,
}

impl ConjunctiveGroup {
    pub fn new(name: &str, members: Vec<GroupMember>) -> Self {
        assert!(!members.is_empty(), "规则表配置错误: 策略组无成员");
        Self {
            name: name.to_string(),
            members,
        }
    }

    /// 组引用到的全部元素符号(去重,保持声明顺序)
    pub fn referenced(&self) -> Vec<String> {
        let mut symbols = Vec::new();
        for member in &self.members {
            for symbol in member.referenced() {
                if !symbols.contains(&symbol) {
                    symbols.push(symbol);
                }
            }
        }
        symbols
    }

    /// 试算整组(只读,无副作用,可反复试算多个组)
    fn evaluate(&self, plate: &Plate) -> GroupOutcome {
        let mut passed = true;
        let mut failed_members = 0usize;
        let mut writes = Vec::new();
        let mut fail_fragments = Vec::new();

        for member in &self.members {
            let outcome = member.evaluate(plate);
            if !outcome.passed {
                passed = false;
                failed_members += 1;
            }
            writes.extend(outcome.writes);
            fail_fragments.extend(outcome.fail_fragments);
        }

        GroupOutcome {
            name: self.name.clone(),
            passed,
            failed_members,
            writes,
            fail_fragments,
            referenced: self.referenced(),
        }
    }
}

struct GroupOutcome {
    name: String,
    passed: bool,
    failed_members: usize,
    writes: Vec<PendingWrite>,
    fail_fragments: Vec<String>,
    referenced: Vec<String>,
}

// ==========================================
// FailAnnotationPolicy - 全失败时的标注范围
// ==========================================
// 两家钢厂的报告口径不同,按方案固定,不统一
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailAnnotationPolicy {
    /// 标注所有组引用过的元素并集
    Union,
    /// 只标注失败成员最少的组(并列取声明序在前者)
    BestGroup,
}

impl fmt::Display for FailAnnotationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailAnnotationPolicy::Union => write!(f, "UNION"),
            FailAnnotationPolicy::BestGroup => write!(f, "BEST_GROUP"),
        }
    }
}

// ==========================================
// DisjunctiveGroupSet - 策略组集(任一组满足)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisjunctiveGroupSet {
    pub groups: Vec<ConjunctiveGroup>,
    pub fail_policy: FailAnnotationPolicy,
}

impl DisjunctiveGroupSet {
    pub fn new(groups: Vec<ConjunctiveGroup>, fail_policy: FailAnnotationPolicy) -> Self {
        assert!(!groups.is_empty(), "规则表配置错误: 策略组集为空");
        Self { groups, fail_policy }
    }

    /// 按声明顺序判定策略组,首个通过的组短路并回写
    ///
    /// # 规则
    /// - 某组通过: 仅该组引用的元素回写 PASS(其余组的元素不动)
    /// - 全部失败: 按 fail_policy 确定标注范围,写入一条列明
    ///   所有已尝试策略及未满足界限的合并消息
    /// - 回写经由 mark 与既有判定 AND 合并(被单项界限判废的元素不会翻案)
    pub fn evaluate(&self, plate: &mut Plate) -> bool {
        let mut attempted: Vec<GroupOutcome> = Vec::new();

        for group in &self.groups {
            let outcome = group.evaluate(plate);
            if outcome.passed {
                tracing::debug!(strategy = %outcome.name, "细化元素策略满足");
                for write in &outcome.writes {
                    if let Some(element) = plate.element_mut(&write.symbol) {
                        element.mark(true, write.message.clone());
                    }
                }
                return true;
            }
            attempted.push(outcome);
        }

        // 全部失败: 合并诊断消息(列明每个已尝试策略)
        let detail = attempted
            .iter()
            .map(|o| format!("[{}] {}", o.name, o.fail_fragments.join("; ")))
            .collect::<Vec<_>>()
            .join(" | ");
        let message = format!("FAIL: 细化元素要求未满足: {}", detail);

        let scope: Vec<String> = match self.fail_policy {
            FailAnnotationPolicy::Union => {
                let mut symbols = Vec::new();
                for outcome in &attempted {
                    for symbol in &outcome.referenced {
                        if !symbols.contains(symbol) {
                            symbols.push(symbol.clone());
                        }
                    }
                }
                symbols
            }
            FailAnnotationPolicy::BestGroup => attempted
                .iter()
                .min_by_key(|o| o.failed_members)
                .map(|o| o.referenced.clone())
                .unwrap_or_default(),
        };

        tracing::debug!(policy = %self.fail_policy, scope = ?scope, "细化元素策略全部失败");
        for symbol in &scope {
            if let Some(element) = plate.element_mut(symbol) {
                element.mark(false, message.clone());
            }
        }
        false
    }

    /// 组集引用到的全部元素符号并集
    pub fn referenced(&self) -> Vec<String> {
        let mut symbols = Vec::new();
        for group in &self.groups {
            for symbol in group.referenced() {
                if !symbols.contains(&symbol) {
                    symbols.push(symbol);
                }
            }
        }
        symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measurement::{ChemicalElement, ScalarMeasurement, TextMeasurement};
    use std::collections::BTreeMap;

    fn plate_with_elements(readings: &[(&str, i64, u32)]) -> Plate {
        let mut elements = BTreeMap::new();
        for (symbol, raw, precision) in readings {
            elements.insert(
                symbol.to_string(),
                ChemicalElement::new(symbol, Some(*raw), Some(*precision)),
            );
        }
        Plate {
            mill: "XG".to_string(),
            plate_no: "P23001".to_string(),
            cert_no: "ZB-2023-0001".to_string(),
            grade: TextMeasurement::new(Some("DH36")),
            thickness: ScalarMeasurement::new(Some(30.0)),
            delivery: TextMeasurement::new(Some("TM")),
            steelmaking: TextMeasurement::new(Some("BOF")),
            yield_strength: ScalarMeasurement::new(Some(380.0)),
            tensile_strength: ScalarMeasurement::new(Some(520.0)),
            elongation: ScalarMeasurement::new(Some(23.0)),
            impact_temperature: ScalarMeasurement::new(Some(-20.0)),
            direction: TextMeasurement::new(Some("L")),
            impact_energies: Vec::new(),
            elements,
        }
    }

    fn al_paired() -> GroupMember {
        GroupMember::paired(
            ElementBound::min("Als", 0.015),
            ElementBound::min("Alt", 0.020),
        )
    }

    // ==========================================
    // 测试 1: 成对替代放行
    // ==========================================

    #[test]
    fn test_paired_override_one_side_passes() {
        // Als 0.015(达标) / Alt 0.009(不达标) → 整对放行,双方消息带 PASS 与 FAIL 两个片段
        let mut plate = plate_with_elements(&[("Als", 15, 3), ("Alt", 9, 3)]);
        let set = DisjunctiveGroupSet::new(
            vec![ConjunctiveGroup::new("AL", vec![al_paired()])],
            FailAnnotationPolicy::Union,
        );

        assert!(set.evaluate(&mut plate));
        for symbol in ["Als", "Alt"] {
            let element = plate.element(symbol).unwrap();
            assert!(element.valid, "{} 应判定通过", symbol);
            let msg = element.message.as_deref().unwrap();
            assert!(msg.contains("PASS:"), "{} 消息缺 PASS 片段: {}", symbol, msg);
            assert!(msg.contains("FAIL:"), "{} 消息缺 FAIL 片段: {}", symbol, msg);
        }
    }

    #[test]
    fn test_paired_both_fail() {
        // Als 0.014 / Alt 0.009 均不达标 → 两侧都判废
        let mut plate = plate_with_elements(&[("Als", 14, 3), ("Alt", 9, 3)]);
        let set = DisjunctiveGroupSet::new(
            vec![ConjunctiveGroup::new("AL", vec![al_paired()])],
            FailAnnotationPolicy::Union,
        );

        assert!(!set.evaluate(&mut plate));
        assert!(!plate.element("Als").unwrap().valid);
        assert!(!plate.element("Alt").unwrap().valid);
    }

    // 成对替代的下限口径: Als 0.015 / Alt 0.010 档在部分方案使用
    #[test]
    fn test_paired_override_lower_alt_threshold() {
        let mut plate = plate_with_elements(&[("Als", 15, 3), ("Alt", 9, 3)]);
        let member = GroupMember::paired(
            ElementBound::min("Als", 0.015),
            ElementBound::min("Alt", 0.010),
        );
        let set = DisjunctiveGroupSet::new(
            vec![ConjunctiveGroup::new("AL", vec![member])],
            FailAnnotationPolicy::Union,
        );

        assert!(set.evaluate(&mut plate));
        assert!(plate.element("Als").unwrap().valid);
        assert!(plate.element("Alt").unwrap().valid);
    }

    // ==========================================
    // 测试 2: 组集短路与回写范围
    // ==========================================

    #[test]
    fn test_first_passing_group_wins_and_others_untouched() {
        // G1(AL) 通过 → 只有 Als/Alt 被标注,Nb 不动
        let mut plate = plate_with_elements(&[("Als", 20, 3), ("Alt", 25, 3), ("Nb", 30, 3)]);
        let set = DisjunctiveGroupSet::new(
            vec![
                ConjunctiveGroup::new("AL", vec![al_paired()]),
                ConjunctiveGroup::new(
                    "NB",
                    vec![GroupMember::Single(ElementBound::range("Nb", 0.020, 0.050))],
                ),
            ],
            FailAnnotationPolicy::Union,
        );

        assert!(set.evaluate(&mut plate));
        assert!(plate.element("Als").unwrap().message.is_some());
        assert!(plate.element("Alt").unwrap().message.is_some());
        assert!(plate.element("Nb").unwrap().message.is_none()); // 未判定的组不留痕
    }

    #[test]
    fn test_all_fail_union_policy() {
        // 两组均失败 → 并集 Als/Alt/Nb 全部标废,共用一条合并消息
        let mut plate = plate_with_elements(&[("Als", 5, 3), ("Alt", 5, 3), ("Nb", 100, 3)]);
        let set = DisjunctiveGroupSet::new(
            vec![
                ConjunctiveGroup::new("AL", vec![al_paired()]),
                ConjunctiveGroup::new(
                    "NB",
                    vec![GroupMember::Single(ElementBound::range("Nb", 0.020, 0.050))],
                ),
            ],
            FailAnnotationPolicy::Union,
        );

        assert!(!set.evaluate(&mut plate));
        for symbol in ["Als", "Alt", "Nb"] {
            let element = plate.element(symbol).unwrap();
            assert!(!element.valid);
            let msg = element.message.as_deref().unwrap();
            assert!(msg.contains("[AL]"));
            assert!(msg.contains("[NB]"));
        }
    }

    #[test]
    fn test_all_fail_best_group_policy() {
        // AL 组 1 个失败成员,NB 组 1 个 → 并列,取声明序在前的 AL 组;Nb 不标注
        let mut plate = plate_with_elements(&[("Als", 5, 3), ("Alt", 5, 3), ("Nb", 100, 3)]);
        let set = DisjunctiveGroupSet::new(
            vec![
                ConjunctiveGroup::new("AL", vec![al_paired()]),
                ConjunctiveGroup::new(
                    "NB",
                    vec![GroupMember::Single(ElementBound::range("Nb", 0.020, 0.050))],
                ),
            ],
            FailAnnotationPolicy::BestGroup,
        );

        assert!(!set.evaluate(&mut plate));
        assert!(!plate.element("Als").unwrap().valid);
        assert!(!plate.element("Alt").unwrap().valid);
        assert!(plate.element("Nb").unwrap().valid); // 非最优组不标注
        assert!(plate.element("Nb").unwrap().message.is_none());
    }

    // ==========================================
    // 测试 3: 合计上限成员
    // ==========================================

    #[test]
    fn test_sum_ceiling_member() {
        // Nb+V+Ti = 0.020+0.060+0.050 = 0.130 > 0.12 → 组失败
        let mut plate = plate_with_elements(&[
            ("Als", 20, 3),
            ("Alt", 25, 3),
            ("Nb", 20, 3),
            ("V", 60, 3),
            ("Ti", 50, 3),
        ]);
        let group = ConjunctiveGroup::new(
            "AL+NB+TI",
            vec![
                al_paired(),
                GroupMember::Single(ElementBound::range("Nb", 0.020, 0.050)),
                GroupMember::sum_ceiling(&["Nb", "V", "Ti"], 0.12),
            ],
        );
        let set = DisjunctiveGroupSet::new(vec![group], FailAnnotationPolicy::Union);

        assert!(!set.evaluate(&mut plate));
        let msg = plate.element("Nb").unwrap().message.as_deref().unwrap();
        assert!(msg.contains("合计"));
    }

    #[test]
    fn test_group_evaluation_is_side_effect_free_until_set_decides() {
        // 组试算本身不落盘: 先失败组后成功组,失败组引用的元素不留失败痕迹
        let mut plate = plate_with_elements(&[("Nb", 100, 3), ("Als", 20, 3), ("Alt", 25, 3)]);
        let set = DisjunctiveGroupSet::new(
            vec![
                ConjunctiveGroup::new(
                    "NB",
                    vec![GroupMember::Single(ElementBound::range("Nb", 0.020, 0.050))],
                ),
                ConjunctiveGroup::new("AL", vec![al_paired()]),
            ],
            FailAnnotationPolicy::Union,
        );

        assert!(set.evaluate(&mut plate));
        let nb = plate.element("Nb").unwrap();
        assert!(nb.valid);
        assert!(nb.message.is_none()); // 试算过但未胜出/未全败 → 不留痕
    }
}
