// ==========================================
// 船板质保书校验系统 - 湘钢(XG)规则选择器
// ==========================================
// 依据: CCS《材料与焊接规范》第1篇第3章 - 船体结构用钢
// 依据: XG_Cert_Profile_v1.1.md - 湘钢质保书栏目与细化元素口径
// ==========================================
// 决策树: 钢级家族 → 厚度档 → 交货状态 → 冲击适用性/细化元素策略
// 口径: 细化元素策略按冶炼方式(转炉/电炉)分档;全失败标注并集
// ==========================================

use crate::domain::plate::Plate;
use crate::domain::types::{Delivery, Grade, GradeFamily, ImpactSlot, Steelmaking, TestDirection};
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
// XgSelector - 湘钢规则选择器
// ==========================================
pub struct XgSelector;

impl XgSelector {
    pub fn new() -> Self {
        Self
    }

    fn element_max(symbol: &str, max: f64) -> Limit {
        Limit::maximum(Target::Element(symbol.to_string()), max)
    }

    fn element_min(symbol: &str, min: f64) -> Limit {
        Limit::minimum(Target::Element(symbol.to_string()), min)
    }

    /// 化学成分界限(家族 + 钢级 + 厚度/冲击联动)
    fn push_chemistry(
        rule_set: &mut RuleSet,
        grade: Grade,
        thickness_mm: f64,
        delivery: Delivery,
        has_impact_records: bool,
    ) {
        // 有害元素上限对全部钢级一致
        rule_set.atomic.push(Self::element_max("P", 0.035));
        rule_set.atomic.push(Self::element_max("S", 0.035));

        match grade.family() {
            GradeFamily::NormalStrength => {
                match grade {
                    Grade::A => {
                        rule_set.atomic.push(Self::element_max("C", 0.21));
                        rule_set.atomic.push(Self::element_max("Si", 0.50));
                        rule_set.atomic.push(Self::element_min("Mn", 0.50));
                    }
                    Grade::B => {
                        rule_set.atomic.push(Self::element_max("C", 0.21));
                        rule_set.atomic.push(Self::element_max("Si", 0.35));
                        // 带冲击试验可放宽;否则 12.5mm 以上取高口径
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
                    _ => unreachable!("一般强度分支只处理 A/B/D/E"),
                }
                // 碳当量简式,判定结果回写 C 与 Mn 两项
                rule_set.atomic.push(Limit::combination(
                    "C",
                    "Mn",
                    CombinationFormula::CarbonManganeseSixth,
                    0.40,
                ));
            }
            family @ (GradeFamily::HighStrength32 | GradeFamily::HighStrength36) => {
                rule_set.atomic.push(Self::element_max("C", 0.18));
                rule_set
                    .atomic
                    .push(Limit::range(Target::Element("Mn".to_string()), 0.90, 1.60));
                rule_set.atomic.push(Self::element_max("Si", 0.50));
                rule_set.atomic.push(Self::element_max("Cu", 0.35));
                rule_set.atomic.push(Self::element_max("Cr", 0.20));
                rule_set.atomic.push(Self::element_max("Ni", 0.40));
                rule_set.atomic.push(Self::element_max("Mo", 0.08));

                // 控轧控冷交货附加碳当量控制
                if delivery == Delivery::Thermomechanical {
                    let ceq_max = match family {
                        GradeFamily::HighStrength32 => 0.36,
                        GradeFamily::HighStrength36 => 0.38,
                        GradeFamily::NormalStrength => unreachable!(),
                    };
                    rule_set.atomic.push(Limit::combination(
                        "C",
                        "Mn",
                        CombinationFormula::CarbonManganeseSixth,
                        ceq_max,
                    ));
                }
            }
        }
    }

    /// 交货状态允许集合(钢级 × 厚度)
    fn push_delivery_scope(rule_set: &mut RuleSet, grade: Grade, thickness_mm: f64) {
        let allowed: Option<&[&str]> = match grade.family() {
            GradeFamily::NormalStrength => match grade {
                Grade::D if thickness_mm > 35.0 => Some(&["N", "TM", "NR"]),
                Grade::E => Some(&["N", "TM"]),
                _ => None, // A/B 及薄规格 D 不限交货状态
            },
            _ if thickness_mm > 20.0 => Some(&["N", "TM", "NR"]),
            _ => None,
        };
        if let Some(allowed) = allowed {
            rule_set.atomic.push(Limit::scope(Target::Delivery, allowed));
        }
    }

    /// 冲击试验适用性(钢级 × 厚度档 × 交货状态)
    fn impact_required(grade: Grade, band: ThicknessBand, thickness_mm: f64, delivery: Delivery) -> bool {
        match grade {
            // A 级薄板免试;中档正火免试
            Grade::A => match band {
                ThicknessBand::UpTo50 => false,
                ThicknessBand::Over50To70 => delivery != Delivery::Normalized,
                ThicknessBand::Over70To150 => true,
            },
            // B 级 25mm 以下免试
            Grade::B => thickness_mm > 25.0,
            // D/E 与全部高强度钢级必试
            _ => true,
        }
    }

    /// 冲击相关界限: 规定温度 + 方向集合 + 平均/单值功下限
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

    /// 细化元素适用钢级: E 级与全部高强度钢级
    fn fine_grain_required(grade: Grade) -> bool {
        grade == Grade::E || grade.family() != GradeFamily::NormalStrength
    }

    // ===== 细化元素策略构件 =====

    fn al_group() -> ConjunctiveGroup {
        ConjunctiveGroup::new(
            "AL",
            vec![GroupMember::paired(
                ElementBound::min("Als", 0.015),
                ElementBound::min("Alt", 0.020),
            )],
        )
    }

    fn nb_group() -> ConjunctiveGroup {
        ConjunctiveGroup::new(
            "NB",
            vec![GroupMember::Single(ElementBound::range("Nb", 0.020, 0.050))],
        )
    }

    fn al_nb_group() -> ConjunctiveGroup {
        ConjunctiveGroup::new(
            "AL+NB",
            vec![
                GroupMember::paired(
                    ElementBound::min("Als", 0.015),
                    ElementBound::min("Alt", 0.020),
                ),
                GroupMember::Single(ElementBound::range("Nb", 0.020, 0.050)),
            ],
        )
    }

    fn al_nb_ti_group() -> ConjunctiveGroup {
        ConjunctiveGroup::new(
            "AL+NB+TI",
            vec![
                GroupMember::paired(
                    ElementBound::min("Als", 0.015),
                    ElementBound::min("Alt", 0.020),
                ),
                GroupMember::Single(ElementBound::range("Nb", 0.020, 0.050)),
                GroupMember::Single(ElementBound::range("Ti", 0.007, 0.020)),
                GroupMember::sum_ceiling(&["Nb", "V", "Ti"], 0.12),
            ],
        )
    }

    /// 细化元素策略组集(冶炼方式 × 厚度档)
    ///
    /// # 规则
    /// - 厚规格可选策略收窄;电炉口径整体严于转炉
    fn fine_grain_set(steelmaking: Steelmaking, band: ThicknessBand) -> DisjunctiveGroupSet {
        let groups = match (steelmaking, band) {
            (Steelmaking::Bof, ThicknessBand::UpTo50) => vec![
                Self::al_group(),
                Self::nb_group(),
                Self::al_nb_group(),
                Self::al_nb_ti_group(),
            ],
            (Steelmaking::Bof, ThicknessBand::Over50To70) => {
                vec![Self::al_group(), Self::al_nb_group(), Self::al_nb_ti_group()]
            }
            (Steelmaking::Bof, ThicknessBand::Over70To150) => vec![Self::al_nb_ti_group()],
            (Steelmaking::Eaf, ThicknessBand::UpTo50) => {
                vec![Self::al_group(), Self::al_nb_group()]
            }
            (Steelmaking::Eaf, ThicknessBand::Over50To70 | ThicknessBand::Over70To150) => {
                vec![Self::al_nb_ti_group()]
            }
        };
        DisjunctiveGroupSet::new(groups, FailAnnotationPolicy::Union)
    }
}

impl Default for XgSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleSelector for XgSelector {
    fn mill(&self) -> &str {
        "XG"
    }

    #[instrument(skip(self, plate), fields(plate_no = %plate.plate_no))]
    fn select(&self, plate: &Plate) -> VerifyResult<RuleSet> {
        // === 步骤 1: 钢级 ===
        let grade_code = plate.grade_code().ok_or_else(|| VerifyError::MissingData {
            plate_no: plate.plate_no.clone(),
            field: "钢级".to_string(),
        })?;
        let grade = match Grade::parse(grade_code) {
            Some(grade) => grade,
            None => {
                // 未识别钢级不是异常: 降级规则集 + 说明,保住元素级部分报告
                debug!(grade_code, "钢级未识别,返回降级规则集");
                return Ok(RuleSet::degraded(format!(
                    "FAIL: 钢级 {} 不在湘钢规则表内",
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

        // === 步骤 5: 细化元素策略(按冶炼方式分档) ===
        if Self::fine_grain_required(grade) {
            let steelmaking_raw =
                plate
                    .steelmaking
                    .raw
                    .as_deref()
                    .ok_or_else(|| VerifyError::MissingData {
                        plate_no: plate.plate_no.clone(),
                        field: "冶炼方式".to_string(),
                    })?;
            let steelmaking = Steelmaking::parse(steelmaking_raw).ok_or_else(|| {
                VerifyError::UnsupportedEnumeration {
                    field: "冶炼方式".to_string(),
                    value: steelmaking_raw.to_string(),
                }
            })?;
            rule_set
                .fine_grain
                .push(Self::fine_grain_set(steelmaking, band));
        }

        debug!(
            grade = %grade,
            thickness_mm,
            delivery = %delivery,
            impact_required,
            atomic = rule_set.atomic.len(),
            fine_grain = rule_set.fine_grain.len(),
            "湘钢规则集选择完成"
        );
        Ok(rule_set)
    }
}
