//! 配置校验模块
//!
//! 校验规则：
//! - 至少配置一个转换器 (imu / detection)
//! - 字段级规则由 `validator` derive 检查 (frame_id 非空、范围、协方差有限)

use contracts::{BridgeConfig, ContractError};
use validator::Validate;

/// 校验 BridgeConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &BridgeConfig) -> Result<(), ContractError> {
    validate_converters_present(config)?;
    validate_fields(config)
}

/// 校验转换器存在
fn validate_converters_present(config: &BridgeConfig) -> Result<(), ContractError> {
    if config.imu.is_none() && config.detection.is_none() {
        return Err(ContractError::config_validation(
            "imu / detection",
            "at least one converter must be configured",
        ));
    }
    Ok(())
}

/// 字段级校验
fn validate_fields(config: &BridgeConfig) -> Result<(), ContractError> {
    config
        .time_base
        .validate()
        .map_err(|e| ContractError::from_validation("time_base", &e))?;
    if let Some(imu) = &config.imu {
        imu.validate()
            .map_err(|e| ContractError::from_validation("imu", &e))?;
    }
    if let Some(detection) = &config.detection {
        detection
            .validate()
            .map_err(|e| ContractError::from_validation("detection", &e))?;
    }
    Ok(())
}
