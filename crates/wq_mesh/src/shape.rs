// crates/wq_mesh/src/shape.rs

//! 多边形有向面积与孔洞判别
//!
//! 岸线裁剪时闭合多边形按绕向分类：负有向面积（顺时针）环路
//! 表示孔洞（岛屿内湖等），与三角形绕向校正使用同一符号约定。

use glam::DVec2;

/// 闭合多边形的有向面积（鞋带公式）
///
/// 逆时针为正。输入不要求重复首点。
pub fn signed_area(polygon: &[DVec2]) -> f64 {
    let n = polygon.len();
    if n < 3 {
        return 0.0;
    }
    let mut acc = 0.0;
    for i in 0..n {
        let a = polygon[i];
        let b = polygon[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    0.5 * acc
}

/// 负有向面积的闭合多边形判为孔洞
#[inline]
pub fn is_hole(polygon: &[DVec2]) -> bool {
    signed_area(polygon) < 0.0
}
