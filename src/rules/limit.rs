// ==========================================
// 船板质保书校验系统 - 界限值判定
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - PART D 界限值体系
// 依据: CCS《材料与焊接规范》第1篇第3章 - 成分/性能表
// ==========================================
// 职责: 封闭的界限值枚举 + 单项判定逻辑
// 红线: 比较一律含边界(值等于界限 → 通过)
// 红线: 规则表构造缺陷在构造函数 panic,不进入运行期错误
// ==========================================

use crate::domain::measurement::Checkable;
use crate::domain::plate::Plate;
use crate::domain::types::ImpactSlot;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Target - 判定对象定位
// ==========================================
// 每条界限值知道自己落在钢板的哪个检测项上
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Target {
    Grade,
    Thickness,
    Delivery,
    YieldStrength,
    TensileStrength,
    Elongation,
    ImpactTemperature,
    Direction,
    ImpactEnergy(ImpactSlot),
    Element(String),
}

impl Target {
    /// 读取数值类检测项的原始值(文本类检测项返回 None)
    pub fn numeric_value(&self, plate: &Plate) -> Option<f64> {
        match self {
            Target::Thickness => plate.thickness.value,
            Target::YieldStrength => plate.yield_strength.value,
            Target::TensileStrength => plate.tensile_strength.value,
            Target::Elongation => plate.elongation.value,
            Target::ImpactTemperature => plate.impact_temperature.value,
            Target::ImpactEnergy(slot) => plate
                .impact_energies
                .iter()
                .find(|e| e.slot == *slot)
                .and_then(|e| e.value),
            Target::Element(symbol) => plate.element(symbol).and_then(|e| e.derived),
            Target::Grade | Target::Delivery | Target::Direction => None,
        }
    }

    /// 读取文本类检测项的原始代码
    pub fn text_value<'a>(&self, plate: &'a Plate) -> Option<&'a str> {
        match self {
            Target::Grade => plate.grade.raw.as_deref(),
            Target::Delivery => plate.delivery.raw.as_deref(),
            Target::Direction => plate.direction.raw.as_deref(),
            _ => None,
        }
    }

    /// 回写判定结果到目标检测项
    ///
    /// # 返回
    /// - false: 目标检测项在钢板上不存在(缺元素/缺冲击记录)
    pub fn mark(&self, plate: &mut Plate, pass: bool, message: String) -> bool {
        match self {
            Target::Grade => plate.grade.mark(pass, message),
            Target::Thickness => plate.thickness.mark(pass, message),
            Target::Delivery => plate.delivery.mark(pass, message),
            Target::YieldStrength => plate.yield_strength.mark(pass, message),
            Target::TensileStrength => plate.tensile_strength.mark(pass, message),
            Target::Elongation => plate.elongation.mark(pass, message),
            Target::ImpactTemperature => plate.impact_temperature.mark(pass, message),
            Target::Direction => plate.direction.mark(pass, message),
            Target::ImpactEnergy(slot) => {
                match plate.impact_energies.iter_mut().find(|e| e.slot == *slot) {
                    Some(energy) => energy.mark(pass, message),
                    None => return false,
                }
            }
            Target::Element(symbol) => match plate.element_mut(symbol) {
                Some(element) => element.mark(pass, message),
                None => return false,
            },
        }
        true
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Grade => write!(f, "钢级"),
            Target::Thickness => write!(f, "厚度"),
            Target::Delivery => write!(f, "交货状态"),
            Target::YieldStrength => write!(f, "ReH"),
            Target::TensileStrength => write!(f, "Rm"),
            Target::Elongation => write!(f, "A"),
            Target::ImpactTemperature => write!(f, "冲击温度"),
            Target::Direction => write!(f, "方向"),
            Target::ImpactEnergy(slot) => write!(f, "{}", slot),
            Target::Element(symbol) => write!(f, "{}", symbol),
        }
    }
}

// ==========================================
// CombinationFormula - 双元素合成量
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombinationFormula {
    /// 碳当量(简式): C + Mn/6
    CarbonManganeseSixth,
}

impl CombinationFormula {
    pub fn compute(&self, first: f64, second: f64) -> f64 {
        match self {
            CombinationFormula::CarbonManganeseSixth => first + second / 6.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CombinationFormula::CarbonManganeseSixth => "C+Mn/6",
        }
    }
}

// ==========================================
// Limit - 界限值(封闭枚举)
// ==========================================
// 每个判定策略一个变体,穷尽匹配;新增策略是编译期可见的改动
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Limit {
    /// 上限(含)
    Maximum { target: Target, max: f64 },
    /// 下限(含)
    Minimum { target: Target, min: f64 },
    /// 区间(双侧含)
    Range { target: Target, min: f64, max: f64 },
    /// 唯一值(如规定的冲击试验温度)
    UniqueValue { target: Target, expected: f64 },
    /// 取值集合(枚举/声明属性)
    Scope { target: Target, allowed: Vec<String> },
    /// 双元素合成量上限,判定结果同时回写两个参与元素
    Combination {
        first: String,
        second: String,
        formula: CombinationFormula,
        max: f64,
    },
}

impl Limit {
    // ===== 校验式构造(规则表配置错误在此 panic) =====

    pub fn maximum(target: Target, max: f64) -> Self {
        assert!(max.is_finite(), "规则表配置错误: Maximum 界限非有限值");
        Limit::Maximum { target, max }
    }

    pub fn minimum(target: Target, min: f64) -> Self {
        assert!(min.is_finite(), "规则表配置错误: Minimum 界限非有限值");
        Limit::Minimum { target, min }
    }

    pub fn range(target: Target, min: f64, max: f64) -> Self {
        assert!(
            min.is_finite() && max.is_finite() && min <= max,
            "规则表配置错误: Range 界限缺失或下限大于上限"
        );
        Limit::Range { target, min, max }
    }

    pub fn unique(target: Target, expected: f64) -> Self {
        assert!(expected.is_finite(), "规则表配置错误: UniqueValue 界限非有限值");
        Limit::UniqueValue { target, expected }
    }

    pub fn scope(target: Target, allowed: &[&str]) -> Self {
        assert!(!allowed.is_empty(), "规则表配置错误: Scope 集合为空");
        Limit::Scope {
            target,
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn combination(first: &str, second: &str, formula: CombinationFormula, max: f64) -> Self {
        assert!(max.is_finite(), "规则表配置错误: Combination 界限非有限值");
        Limit::Combination {
            first: first.to_string(),
            second: second.to_string(),
            formula,
            max,
        }
    }

    // ===== 判定 =====

    /// 数值判定 (Maximum/Minimum/Range/UniqueValue)
    pub fn evaluate(&self, actual: f64) -> (bool, String) {
        match self {
            Limit::Maximum { target, max } => {
                if actual <= *max {
                    (true, format!("PASS: {} {} <= {}", target, actual, max))
                } else {
                    (false, format!("FAIL: {} {} 超上限 {}", target, actual, max))
                }
            }
            Limit::Minimum { target, min } => {
                if actual >= *min {
                    (true, format!("PASS: {} {} >= {}", target, actual, min))
                } else {
                    (false, format!("FAIL: {} {} 低于下限 {}", target, actual, min))
                }
            }
            Limit::Range { target, min, max } => {
                if actual < *min {
                    (
                        false,
                        format!("FAIL: {} {} 低于下限 {} (区间 {}-{})", target, actual, min, min, max),
                    )
                } else if actual > *max {
                    (
                        false,
                        format!("FAIL: {} {} 超上限 {} (区间 {}-{})", target, actual, max, min, max),
                    )
                } else {
                    (true, format!("PASS: {} {} 在区间 {}-{}", target, actual, min, max))
                }
            }
            Limit::UniqueValue { target, expected } => {
                if actual == *expected {
                    (true, format!("PASS: {} {} = 规定值 {}", target, actual, expected))
                } else {
                    (
                        false,
                        format!("FAIL: {} {} != 规定值 {}", target, actual, expected),
                    )
                }
            }
            Limit::Scope { .. } | Limit::Combination { .. } => {
                unreachable!("evaluate 仅适用于数值界限")
            }
        }
    }

    /// 文本判定 (Scope)
    pub fn evaluate_text(&self, actual: &str) -> (bool, String) {
        match self {
            Limit::Scope { target, allowed } => {
                let normalized = actual.trim().to_uppercase();
                if allowed.iter().any(|a| *a == normalized) {
                    (true, format!("PASS: {} {} 在允许集合内", target, normalized))
                } else {
                    (
                        false,
                        format!(
                            "FAIL: {} {} 不在允许集合 [{}]",
                            target,
                            normalized,
                            allowed.join("/")
                        ),
                    )
                }
            }
            _ => unreachable!("evaluate_text 仅适用于 Scope"),
        }
    }

    /// 合成量判定 (Combination),两个换算值由调用方取出
    pub fn evaluate_combined(&self, first_value: f64, second_value: f64) -> (bool, String) {
        match self {
            Limit::Combination { formula, max, .. } => {
                let combined = formula.compute(first_value, second_value);
                if combined <= *max {
                    (
                        true,
                        format!("PASS: {} {:.4} <= {:.4}", formula.label(), combined, max),
                    )
                } else {
                    (
                        false,
                        format!("FAIL: {} {:.4} 超上限 {:.4}", formula.label(), combined, max),
                    )
                }
            }
            _ => unreachable!("evaluate_combined 仅适用于 Combination"),
        }
    }
}
