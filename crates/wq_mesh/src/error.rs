// crates/wq_mesh/src/error.rs

//! 网格处理错误类型
//!
//! 拓扑与分层的构造期错误。全部致命：构造失败即传播，不做降级。

use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误枚举
#[derive(Error, Debug)]
pub enum MeshError {
    /// 退化网格拓扑
    #[error("退化网格: {operation} 失败, {details}")]
    DegenerateMesh {
        /// 出错的构建阶段
        operation: &'static str,
        /// 具体错误信息
        details: String,
    },

    /// 垂向层数无效
    #[error("垂向层数无效: n_layers={n}, 至少需要 1 层")]
    InvalidLayerCount {
        /// 请求的层数
        n: usize,
    },

    /// σ 序列无效
    #[error("σ 序列无效: {message}")]
    InvalidSigma {
        /// 具体错误信息
        message: String,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },
}

impl MeshError {
    /// 退化网格
    pub fn degenerate(operation: &'static str, details: impl Into<String>) -> Self {
        Self::DegenerateMesh {
            operation,
            details: details.into(),
        }
    }

    /// σ 序列无效
    pub fn invalid_sigma(message: impl Into<String>) -> Self {
        Self::InvalidSigma {
            message: message.into(),
        }
    }

    /// 检查数组大小
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> MeshResult<()> {
        if expected != actual {
            Err(Self::SizeMismatch {
                name,
                expected,
                actual,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_display() {
        let err = MeshError::degenerate("triangle_areas", "单元 3 面积为零");
        assert!(err.to_string().contains("triangle_areas"));
        assert!(err.to_string().contains("单元 3"));
    }

    #[test]
    fn test_layer_count_display() {
        let err = MeshError::InvalidLayerCount { n: 0 };
        assert!(err.to_string().contains("n_layers=0"));
    }
}
