// ==========================================
// 船板质保书校验系统 - 济钢(JG)规则选择器
// ==========================================
// 依据: CCS《材料与焊接规范》第1篇第3章 - 船体结构用钢
// 依据: JG_Cert_Profile_v0.9.md - 济钢质保书栏目与承制范围
// ==========================================
// 口径: 济钢只承制一般强度与 36 系高强度船板,质保书无冶炼方式栏;
// 细化元素全失败只标注最接近通过的策略组
// ==========================================

use crate::domain::plate::Plate;
use crate::domain::types::{Delivery, Grade, GradeFamily, ImpactSlot, TestDirection};
use crate::error::{VerifyError, VerifyResult};
use crate::rules::fine_grain::{
    ConjunctiveGroup, DisjunctiveGroupSet, ElementBound, FailAnnotationPolicy, GroupMember,
};
use crate::rules::limit::{CombinationFormula, Limit, Target};
use crate::rules::selector::{
    impact_energy_min_j, impact_single_min_j, mechanical_limits, thickness_band, RuleSelector,
    RuleSet, ThicknessBand,
};
use tracing::{debug, instrument};

// ==========================================
// JgSelector - 济钢规则选择器
// ==========================================
pub struct JgSelector;

impl JgSelector {
    pub fn new() -> Self {
        Self
    }

    fn element_max(symbol: &str, max: f64) -> Limit {
        Limit::maximum(Target::Element(symbol.to_string()), max)
    }

    fn element_min(symbol: &str, min: f64) -> Limit {
        Limit::minimum(Target::Element(symbol.to_string()), min)
    }

    /// 济钢承制范围: 一般强度全系 + 36 系高强度
    fn in_product_range(grade: Grade) -> bool {
        grade.family() != GradeFamily::HighStrength32
    }

    /// 化学成分界限
    fn push_chemistry(
        rule_set: &mut RuleSet,
        grade: Grade,
        thickness_mm: f64,
        delivery: Delivery,
        has_impact_records: bool,
    ) {
        rule_set.atomic.push(Self::element_max("P", 0.035));
        rule_set.atomic.push(Self::element_max("S", 0.035));

        match grade {
            Grade::A => {
                rule_set.atomic.push(Self::element_max("C", 0.21));
                rule_set.atomic.push(Self::element_max("Si", 0.50));
                rule_set.atomic.push(Self::element_min("Mn", 0.50));
            }
            Grade::B => {
                rule_set.atomic.push(Self::element_max("C", 0.21));
                rule_set.atomic.push(Self::element_max("Si", 0.35));
                let mn_min = if has_impact_records || thickness_mm <= 12.5 {
                    0.60
                } else {
                    0.80
                };
                rule_set.atomic.push(Self::element_min("Mn", mn_min));
            }
            Grade::D => {
                rule_set.atomic.push(Self::element_max("C", 0.21));
                rule_set.atomic.push(Self::element_max("Si", 0.35));
                rule_set.atomic.push(Self::element_min("Mn", 0.60));
            }
            Grade::E => {
                rule_set.atomic.push(Self::element_max("C", 0.18));
                rule_set.atomic.push(Self::element_max("Si", 0.35));
                rule_set.atomic.push(Self::element_min("Mn", 0.70));
            }
            // 36 系高强度
            Grade::Ah36 | Grade::Dh36 | Grade::Eh36 => {
                rule_set.atomic.push(Self::element_max("C", 0.18));
                rule_set
                    .atomic
                    .push(Limit::range(Target::Element("Mn".to_string()), 0.90, 1.60));
                rule_set.atomic.push(Self::element_max("Si", 0.50));
                rule_set.atomic.push(Self::element_max("Cu", 0.35));
                rule_set.atomic.push(Self::element_max("Cr", 0.20));
                rule_set.atomic.push(Self::element_max("Ni", 0.40));
                rule_set.atomic.push(Self::element_max("Mo", 0.08));
                if delivery == Delivery::Thermomechanical {
                    rule_set.atomic.push(Limit::combination(
                        "C",
                        "Mn",
                        CombinationFormula::CarbonManganeseSixth,
                        0.38,
                    ));
                }
            }
            Grade::Ah32 | Grade::Dh32 | Grade::Eh32 => {
                unreachable!("32 系在承制范围检查处已拦截")
            }
        }

        if grade.family() == GradeFamily::NormalStrength {
            rule_set.atomic.push(Limit::combination(
                "C",
                "Mn",
                CombinationFormula::CarbonManganeseSixth,
                0.40,
            ));
        }
    }

    /// 交货状态允许集合
    fn push_delivery_scope(rule_set: &mut RuleSet, grade: Grade, thickness_mm: f64) {
        let allowed: Option<&[&str]> = match grade {
            Grade::D if thickness_mm > 35.0 => Some(&["N", "TM", "NR"]),
            Grade::E => Some(&["N", "TM"]),
            Grade::Ah36 | Grade::Dh36 | Grade::Eh36 if thickness_mm > 20.0 => {
                Some(&["N", "TM", "NR"])
            }
            _ => None,
        };
        if let Some(allowed) = allowed {
            rule_set.atomic.push(Limit::scope(Target::Delivery, allowed));
        }
    }

    /// 冲击试验适用性(与船级社口径一致)
    fn impact_required(grade: Grade, band: ThicknessBand, thickness_mm: f64, delivery: Delivery) -> bool {
        match grade {
            Grade::A => match band {
                ThicknessBand::UpTo50 => false,
                ThicknessBand::Over50To70 => delivery != Delivery::Normalized,
                ThicknessBand::Over70To150 => true,
            },
            Grade::B => thickness_mm > 25.0,
            _ => true,
        }
    }

    fn push_impact_limits(
        rule_set: &mut RuleSet,
        plate: &Plate,
        grade: Grade,
        band: ThicknessBand,
    ) -> VerifyResult<()> {
        let direction_raw =
            plate
                .direction
                .raw
                .as_deref()
                .ok_or_else(|| VerifyError::MissingData {
                    plate_no: plate.plate_no.clone(),
                    field: "试验方向".to_string(),
                })?;
        let direction = TestDirection::parse(direction_raw).ok_or_else(|| {
            VerifyError::UnsupportedEnumeration {
                field: "试验方向".to_string(),
                value: direction_raw.to_string(),
            }
        })?;

        rule_set.atomic.push(Limit::unique(
            Target::ImpactTemperature,
            grade.impact_temperature_c(),
        ));
        rule_set
            .atomic
            .push(Limit::scope(Target::Direction, &["L", "T"]));

        let average_min = impact_energy_min_j(grade.family(), band, direction);
        let single_min = impact_single_min_j(average_min);
        rule_set.atomic.push(Limit::minimum(
            Target::ImpactEnergy(ImpactSlot::Average),
            average_min,
        ));
        for slot in [
            ImpactSlot::Specimen1,
            ImpactSlot::Specimen2,
            ImpactSlot::Specimen3,
        ] {
            rule_set
                .atomic
                .push(Limit::minimum(Target::ImpactEnergy(slot), single_min));
        }
        Ok(())
    }

    /// 细化元素适用钢级: D/E 与 36 系高强度
    fn fine_grain_required(grade: Grade) -> bool {
        matches!(
            grade,
            Grade::D | Grade::E | Grade::Ah36 | Grade::Dh36 | Grade::Eh36
        )
    }

    // ===== 细化元素策略构件 =====
    // 济钢质保书全铝栏按 0.010 口径报出

    fn al_group() -> ConjunctiveGroup {
        ConjunctiveGroup::new(
            "AL",
            vec![GroupMember::paired(
                ElementBound::min("Als", 0.015),
                ElementBound::min("Alt", 0.010),
            )],
        )
    }

    fn al_ti_group() -> ConjunctiveGroup {
        ConjunctiveGroup::new(
            "AL+TI",
            vec![
                GroupMember::paired(
                    ElementBound::min("Als", 0.015),
                    ElementBound::min("Alt", 0.010),
                ),
                GroupMember::Single(ElementBound::range("Ti", 0.007, 0.020)),
            ],
        )
    }

    /// 细化元素策略组集(钢级家族 × 厚度档,无冶炼方式维度)
    fn fine_grain_set(grade: Grade, band: ThicknessBand) -> DisjunctiveGroupSet {
        let groups = if grade.family() == GradeFamily::NormalStrength {
            // D/E 只认铝
            vec![Self::al_group()]
        } else {
            match band {
                ThicknessBand::UpTo50 => vec![Self::al_group(), Self::al_ti_group()],
                ThicknessBand::Over50To70 | ThicknessBand::Over70To150 => {
                    vec![Self::al_ti_group()]
                }
            }
        };
        DisjunctiveGroupSet::new(groups, FailAnnotationPolicy::BestGroup)
    }
}

impl Default for JgSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSelector for JgSelector {
    fn mill(&self) -> &str {
        "JG"
    }

    #[instrument(skip(self, plate), fields(plate_no = %plate.plate_no))]
    fn select(&self, plate: &Plate) -> VerifyResult<RuleSet> {
        // === 步骤 1: 钢级与承制范围 ===
        let grade_code = plate.grade_code().ok_or_else(|| VerifyError::MissingData {
            plate_no: plate.plate_no.clone(),
            field: "钢级".to_string(),
        })?;
        let grade = match Grade::parse(grade_code) {
            Some(grade) if Self::in_product_range(grade) => grade,
            Some(grade) => {
                debug!(%grade, "钢级超出济钢承制范围,返回降级规则集");
                return Ok(RuleSet::degraded(format!(
                    "FAIL: 钢级 {} 不在济钢承制范围内",
                    grade
                )));
            }
            None => {
                debug!(grade_code, "钢级未识别,返回降级规则集");
                return Ok(RuleSet::degraded(format!(
                    "FAIL: 钢级 {} 不在济钢规则表内",
                    grade_code
                )));
            }
        };

        // === 步骤 2: 厚度落档 ===
        let thickness_mm = plate
            .thickness
            .value
            .ok_or_else(|| VerifyError::MissingData {
                plate_no: plate.plate_no.clone(),
                field: "厚度".to_string(),
            })?;
        let band = thickness_band(thickness_mm).ok_or(VerifyError::ThicknessOutOfRange {
            grade: grade.to_string(),
            thickness_mm,
        })?;

        // === 步骤 3: 交货状态 ===
        let delivery_raw = plate
            .delivery
            .raw
            .as_deref()
            .ok_or_else(|| VerifyError::MissingData {
                plate_no: plate.plate_no.clone(),
                field: "交货状态".to_string(),
            })?;
        let delivery = Delivery::parse(delivery_raw).ok_or_else(|| {
            VerifyError::UnsupportedEnumeration {
                field: "交货状态".to_string(),
                value: delivery_raw.to_string(),
            }
        })?;

        // === 步骤 4: 组装规则集 ===
        let mut rule_set = RuleSet::new();
        rule_set.atomic.extend(mechanical_limits(grade.family()));
        Self::push_chemistry(
            &mut rule_set,
            grade,
            thickness_mm,
            delivery,
            plate.has_impact_records(),
        );
        Self::push_delivery_scope(&mut rule_set, grade, thickness_mm);

        let impact_required = Self::impact_required(grade, band, thickness_mm, delivery);
        if impact_required {
            Self::push_impact_limits(&mut rule_set, plate, grade, band)?;
        }

        if Self::fine_grain_required(grade) {
            rule_set.fine_grain.push(Self::fine_grain_set(grade, band));
        }

        debug!(
            grade = %grade,
            thickness_mm,
            delivery = %delivery,
            impact_required,
            atomic = rule_set.atomic.len(),
            fine_grain = rule_set.fine_grain.len(),
            "济钢规则集选择完成"
        );
        Ok(rule_set)
    }
}
