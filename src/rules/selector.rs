// ==========================================
// 船板质保书校验系统 - 规则选择器接口与注册表
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - PART F 规则选择
// 依据: CCS《材料与焊接规范》第1篇第3章 - 力学性能/冲击功表
// ==========================================
// 职责: 选择器 trait、规则集容器、钢厂注册表、两厂共用的船级社表
// 红线: 选择器对钢板只读;判定回写一律由校验引擎执行
// 红线: 注册表显式构造一次后只读,不做进程级全局状态
// ==========================================

use crate::domain::plate::Plate;
use crate::domain::types::{GradeFamily, TestDirection};
use crate::error::VerifyResult;
use crate::rules::fine_grain::DisjunctiveGroupSet;
use crate::rules::limit::{Limit, Target};
use std::collections::HashMap;

// ==========================================
// RuleSet - 一块钢板适用的规则集
// ==========================================
#[derive(Debug, Clone)]
pub struct RuleSet {
    /// 单项界限(原子阶段逐条判定)
    pub atomic: Vec<Limit>,
    /// 细化元素策略组集(组合阶段判定)
    pub fine_grain: Vec<DisjunctiveGroupSet>,
    /// 钢级未识别时的说明(由引擎回写到 GradeDesignation,选择器不落盘)
    pub unsupported_grade: Option<String>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self {
            atomic: Vec::new(),
            fine_grain: Vec::new(),
            unsupported_grade: None,
        }
    }

    /// 钢级未识别时的降级规则集: 只保留与钢级无关的有害元素上限,
    /// 保证元素级结果仍可部分出报告
    pub fn degraded(grade_message: String) -> Self {
        Self {
            atomic: vec![
                Limit::maximum(Target::Element("P".to_string()), 0.035),
                Limit::maximum(Target::Element("S".to_string()), 0.035),
            ],
            fine_grain: Vec::new(),
            unsupported_grade: Some(grade_message),
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// RuleSelector - 按钢厂实现的规则选择器
// ==========================================
// 决策树: 钢级家族 → 厚度档 → 交货状态 → (冲击适用性/细化元素策略)
pub trait RuleSelector: Send + Sync {
    /// 钢厂代码(注册键)
    fn mill(&self) -> &str;

    /// 为一块钢板选出适用规则集(对钢板只读)
    fn select(&self, plate: &Plate) -> VerifyResult<RuleSet>;
}

// ==========================================
// SelectorRegistry - 钢厂 → 选择器映射
// ==========================================
// 启动时构造一次,随引擎传入;构造后只读,可跨线程共享
pub struct SelectorRegistry {
    selectors: HashMap<String, Box<dyn RuleSelector>>,
}

impl SelectorRegistry {
    pub fn new() -> Self {
        Self {
            selectors: HashMap::new(),
        }
    }

    /// 内置两厂选择器的注册表
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(crate::rules::xg::XgSelector::new()));
        registry.register(Box::new(crate::rules::jg::JgSelector::new()));
        registry
    }

    pub fn register(&mut self, selector: Box<dyn RuleSelector>) {
        self.selectors.insert(selector.mill().to_string(), selector);
    }

    pub fn get(&self, mill: &str) -> Option<&dyn RuleSelector> {
        self.selectors.get(mill).map(|s| s.as_ref())
    }

    pub fn mills(&self) -> Vec<&str> {
        self.selectors.keys().map(|k| k.as_str()).collect()
    }
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 厚度档 (Thickness Band)
// ==========================================
// 船级社按 ≤50 / (50,70] / (70,150] 三档取冲击功界限
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ThicknessBand {
    UpTo50,
    Over50To70,
    Over70To150,
}

/// 厚度落档;超出全部档位(含非正值)返回 None,由选择器报硬性未命中
pub(crate) fn thickness_band(thickness_mm: f64) -> Option<ThicknessBand> {
    if thickness_mm <= 0.0 {
        None
    } else if thickness_mm <= 50.0 {
        Some(ThicknessBand::UpTo50)
    } else if thickness_mm <= 70.0 {
        Some(ThicknessBand::Over50To70)
    } else if thickness_mm <= 150.0 {
        Some(ThicknessBand::Over70To150)
    } else {
        None
    }
}

// ==========================================
// 船级社共用表(两厂同规范,表值一致)
// ==========================================

/// 力学性能界限: 屈服下限 / 抗拉区间 / 伸长率下限(按钢级家族)
pub(crate) fn mechanical_limits(family: GradeFamily) -> Vec<Limit> {
    let (reh_min, rm_min, rm_max, a_min) = match family {
        GradeFamily::NormalStrength => (235.0, 400.0, 520.0, 22.0),
        GradeFamily::HighStrength32 => (315.0, 440.0, 570.0, 22.0),
        GradeFamily::HighStrength36 => (355.0, 490.0, 630.0, 21.0),
    };
    vec![
        Limit::minimum(Target::YieldStrength, reh_min),
        Limit::range(Target::TensileStrength, rm_min, rm_max),
        Limit::minimum(Target::Elongation, a_min),
    ]
}

/// 冲击功平均值下限(J),按家族 × 厚度档 × 方向
///
/// # 规则
/// - 纵向界限恒不低于同档横向界限
pub(crate) fn impact_energy_min_j(
    family: GradeFamily,
    band: ThicknessBand,
    direction: TestDirection,
) -> f64 {
    use GradeFamily::*;
    use TestDirection::*;
    use ThicknessBand::*;

    match (family, band, direction) {
        (NormalStrength, UpTo50, Longitudinal) => 27.0,
        (NormalStrength, UpTo50, Transverse) => 20.0,
        (NormalStrength, Over50To70, Longitudinal) => 34.0,
        (NormalStrength, Over50To70, Transverse) => 24.0,
        (NormalStrength, Over70To150, Longitudinal) => 41.0,
        (NormalStrength, Over70To150, Transverse) => 27.0,

        (HighStrength32, UpTo50, Longitudinal) => 31.0,
        (HighStrength32, UpTo50, Transverse) => 22.0,
        (HighStrength32, Over50To70, Longitudinal) => 38.0,
        (HighStrength32, Over50To70, Transverse) => 26.0,
        (HighStrength32, Over70To150, Longitudinal) => 46.0,
        (HighStrength32, Over70To150, Transverse) => 31.0,

        (HighStrength36, UpTo50, Longitudinal) => 34.0,
        (HighStrength36, UpTo50, Transverse) => 24.0,
        (HighStrength36, Over50To70, Longitudinal) => 41.0,
        (HighStrength36, Over50To70, Transverse) => 27.0,
        (HighStrength36, Over70To150, Longitudinal) => 50.0,
        (HighStrength36, Over70To150, Transverse) => 34.0,
    }
}

/// 单值试样下限 = 平均值下限的 70%,四舍五入到 1J
pub(crate) fn impact_single_min_j(average_min_j: f64) -> f64 {
    (average_min_j * 0.7).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thickness_band_boundaries() {
        assert_eq!(thickness_band(50.0), Some(ThicknessBand::UpTo50));
        assert_eq!(thickness_band(50.1), Some(ThicknessBand::Over50To70));
        assert_eq!(thickness_band(70.0), Some(ThicknessBand::Over50To70));
        assert_eq!(thickness_band(150.0), Some(ThicknessBand::Over70To150));
        assert_eq!(thickness_band(150.1), None);
        assert_eq!(thickness_band(0.0), None);
        assert_eq!(thickness_band(-3.0), None);
    }

    #[test]
    fn test_longitudinal_never_below_transverse() {
        // 同档纵向界限 >= 横向界限
        for family in [
            GradeFamily::NormalStrength,
            GradeFamily::HighStrength32,
            GradeFamily::HighStrength36,
        ] {
            for band in [
                ThicknessBand::UpTo50,
                ThicknessBand::Over50To70,
                ThicknessBand::Over70To150,
            ] {
                let l = impact_energy_min_j(family, band, TestDirection::Longitudinal);
                let t = impact_energy_min_j(family, band, TestDirection::Transverse);
                assert!(l >= t, "{:?}/{:?}: 纵向 {} < 横向 {}", family, band, l, t);
            }
        }
    }

    #[test]
    fn test_single_specimen_ratio() {
        assert_eq!(impact_single_min_j(34.0), 24.0); // 34 × 0.7 = 23.8 → 24
        assert_eq!(impact_single_min_j(27.0), 19.0); // 18.9 → 19
        assert_eq!(impact_single_min_j(50.0), 35.0);
    }
}
