// ==========================================
// 船板质保书校验系统 - 校验引擎
// ==========================================
// 依据: Cert_Verify_Spec_v0.2.md - PART G 校验流程
// ==========================================
// 职责: 单一入口串联 选择 → 单项阶段 → 组合阶段 → 汇总
// 红线: 阶段顺序固定,单项阶段完整结束后才进组合阶段
//       (成对替代的放行要读到单项阶段已写入的判定)
// 红线: 除钢板自身的判定字段外无副作用,同输入必同输出
// ==========================================

use crate::domain::measurement::Checkable;
use crate::domain::plate::Plate;
use crate::error::{VerifyError, VerifyResult};
use crate::rules::limit::{Limit, Target};
use crate::rules::selector::SelectorRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

// ==========================================
// VerificationSummary - 单板校验结论
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub plate_no: String,
    pub verified: bool,             // 整板结论: 所有检测项判定的 AND
    pub atomic_checked: usize,      // 单项界限条数
    pub group_sets_checked: usize,  // 细化元素组集条数
    pub failed: Vec<String>,        // 不合格检测项清单
    pub verified_at: DateTime<Utc>, // 校验时刻
}

// ==========================================
// VerificationEngine - 校验引擎
// ==========================================
// 注册表在构造时注入,构造后只读;引擎可跨线程共享,
// 各板的判定互不相干(一板一工作者即可并行)
pub struct VerificationEngine {
    registry: SelectorRegistry,
}

impl VerificationEngine {
    pub fn new(registry: SelectorRegistry) -> Self {
        Self { registry }
    }

    /// 内置两厂选择器的引擎
    pub fn with_builtin() -> Self {
        Self::new(SelectorRegistry::with_builtin())
    }

    /// 校验一块钢板,回写各检测项判定并给出整板结论
    ///
    /// # 错误
    /// - UnknownMill: 钢厂代码未注册
    /// - MissingData/ImpactRecordCount: 本板转人工复核,调用方继续后续钢板
    /// - UnsupportedEnumeration/ThicknessOutOfRange: 本板中止,调用方继续
    #[instrument(skip(self, plate), fields(mill = %plate.mill, plate_no = %plate.plate_no))]
    pub fn verify(&self, plate: &mut Plate) -> VerifyResult<VerificationSummary> {
        let selector =
            self.registry
                .get(&plate.mill)
                .ok_or_else(|| VerifyError::UnknownMill {
                    mill: plate.mill.clone(),
                })?;
        let rule_set = selector.select(plate)?;

        // 钢级未识别由引擎统一回写(选择器对钢板只读)
        if let Some(message) = &rule_set.unsupported_grade {
            plate.grade.mark(false, message.clone());
        }

        // 冲击记录条数门槛: 规则集含冲击界限时必须恰好 4 条
        let needs_impact = rule_set
            .atomic
            .iter()
            .any(|limit| matches!(limit_target(limit), Some(Target::ImpactEnergy(_))));
        if needs_impact && plate.impact_energies.len() != 4 {
            return Err(VerifyError::ImpactRecordCount {
                plate_no: plate.plate_no.clone(),
                actual: plate.impact_energies.len(),
            });
        }

        // === 阶段 1: 单项界限 ===
        for limit in &rule_set.atomic {
            self.apply_atomic(plate, limit)?;
        }

        // === 阶段 2: 细化元素策略组集 ===
        for group_set in &rule_set.fine_grain {
            group_set.evaluate(plate);
        }

        // === 阶段 3: 汇总 ===
        let verified = plate.all_valid();
        let failed = plate.failed_items();
        info!(verified, failed = failed.len(), "钢板校验完成");

        Ok(VerificationSummary {
            plate_no: plate.plate_no.clone(),
            verified,
            atomic_checked: rule_set.atomic.len(),
            group_sets_checked: rule_set.fine_grain.len(),
            failed,
            verified_at: Utc::now(),
        })
    }

    /// 单项界限判定 + 回写
    fn apply_atomic(&self, plate: &mut Plate, limit: &Limit) -> VerifyResult<()> {
        match limit {
            Limit::Scope { target, .. } => {
                let actual = target
                    .text_value(plate)
                    .ok_or_else(|| missing_data(plate, target))?
                    .to_string();
                let (pass, message) = limit.evaluate_text(&actual);
                target.mark(plate, pass, message);
                Ok(())
            }
            Limit::Combination { first, second, .. } => {
                let first_value = plate.element(first).and_then(|e| e.derived).ok_or_else(|| {
                    VerifyError::MissingData {
                        plate_no: plate.plate_no.clone(),
                        field: format!("元素 {} 换算值", first),
                    }
                })?;
                let second_value =
                    plate.element(second).and_then(|e| e.derived).ok_or_else(|| {
                        VerifyError::MissingData {
                            plate_no: plate.plate_no.clone(),
                            field: format!("元素 {} 换算值", second),
                        }
                    })?;
                let (pass, message) = limit.evaluate_combined(first_value, second_value);
                // 同一判定与消息写入两个参与元素,与既有判定 AND 合并
                Target::Element(first.clone()).mark(plate, pass, message.clone());
                Target::Element(second.clone()).mark(plate, pass, message);
                Ok(())
            }
            Limit::Maximum { target, .. }
            | Limit::Minimum { target, .. }
            | Limit::Range { target, .. }
            | Limit::UniqueValue { target, .. } => {
                let actual = target
                    .numeric_value(plate)
                    .ok_or_else(|| missing_data(plate, target))?;
                let (pass, message) = limit.evaluate(actual);
                if !target.mark(plate, pass, message) {
                    return Err(missing_data(plate, target));
                }
                Ok(())
            }
        }
    }
}

/// 界限的目标定位(Combination 无单一目标)
fn limit_target(limit: &Limit) -> Option<&Target> {
    match limit {
        Limit::Maximum { target, .. }
        | Limit::Minimum { target, .. }
        | Limit::Range { target, .. }
        | Limit::UniqueValue { target, .. }
        | Limit::Scope { target, .. } => Some(target),
        Limit::Combination { .. } => None,
    }
}

fn missing_data(plate: &Plate, target: &Target) -> VerifyError {
    VerifyError::MissingData {
        plate_no: plate.plate_no.clone(),
        field: target.to_string(),
    }
}
