//! 确定性种子生成器
//!
//! 所有引擎共享同一套伪随机算法：相同种子 + 相同调用序列 ⇒ 逐位相同的输出。
//! 算法版本固定，修改任何常量都会改变所有既有结果的可复现性。

use uuid::Uuid;

/// 线性同余乘数
const LCG_MULTIPLIER: u64 = 9301;
/// 线性同余增量
const LCG_INCREMENT: u64 = 49297;
/// 线性同余模数
const LCG_MODULUS: u64 = 233_280;

/// 种子字段分隔符
const SEED_FIELD_SEPARATOR: &str = "|";

/// 伪随机数源
///
/// 只需实现 `next_f64`，抽取、选择、洗牌等操作都建立在它之上，
/// 保证同一种子下的所有派生操作同样可复现。
pub trait RandomSource {
    /// 返回 `[0, 1)` 区间内的下一个浮点数
    fn next_f64(&mut self) -> f64;

    /// `[0, len)` 内的随机下标；`len == 0` 时返回 `None`
    fn next_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let index = (self.next_f64() * len as f64).floor() as usize;
        Some(index.min(len - 1))
    }

    /// `[min, max]` 闭区间内的随机整数 (边界颠倒时自动交换)
    fn range_inclusive(&mut self, min: i64, max: i64) -> i64 {
        let (low, high) = if min <= max { (min, max) } else { (max, min) };
        let width = high.abs_diff(low);
        let offset = (self.next_f64() * (width as f64 + 1.0)).floor() as u64;
        low.wrapping_add_unsigned(offset.min(width))
    }

    /// 以概率 `probability` 返回 true
    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// 从切片中随机选择一个元素
    fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.next_index(items.len()).map(|i| &items[i])
    }

    /// Fisher-Yates 洗牌 (从尾部向前)
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.next_f64() * (i + 1) as f64).floor() as usize;
            items.swap(i, j.min(i));
        }
    }

    /// 从 `[0, len)` 中不重复地抽取 `count` 个下标，保持抽取顺序
    fn draw_distinct(&mut self, count: usize, len: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..len).collect();
        self.shuffle(&mut indices);
        indices.truncate(count.min(len));
        indices
    }
}

/// 种子生成器
///
/// 状态为 32 位整数，每个实例独占，不可跨引擎共享；随时可由种子重新推导。
#[derive(Debug, Clone)]
pub struct SeededGenerator {
    /// 原始种子
    seed: String,
    /// 当前状态
    state: u32,
}

impl SeededGenerator {
    /// 从任意字符串种子创建生成器，空字符串的初始状态为 0
    pub fn new(seed: impl Into<String>) -> Self {
        let seed = seed.into();
        let state = hash_seed(&seed);
        Self { seed, state }
    }

    /// 非复现模式：以随机 UUID 作为种子
    ///
    /// 仅用于交互式场景；`seed()` 仍可取回种子以便事后重放。
    pub fn unseeded() -> Self {
        let generator = Self::new(Uuid::new_v4().to_string());
        tracing::debug!(seed = %generator.seed, "created unseeded generator");
        generator
    }

    /// 由多个稳定输入字段拼接种子并创建生成器
    pub fn from_fields(fields: &[&str]) -> Self {
        Self::new(seed_from_fields(fields))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// 当前内部状态
    pub fn state(&self) -> u32 {
        self.state
    }

    /// 重置到种子对应的初始状态
    pub fn reset(&mut self) {
        self.state = hash_seed(&self.seed);
    }
}

impl RandomSource for SeededGenerator {
    fn next_f64(&mut self) -> f64 {
        let next = (u64::from(self.state) * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS;
        self.state = next as u32;
        next as f64 / LCG_MODULUS as f64
    }
}

impl Iterator for SeededGenerator {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        Some(self.next_f64())
    }
}

/// 拼接种子字段
pub fn seed_from_fields(fields: &[&str]) -> String {
    fields.join(SEED_FIELD_SEPARATOR)
}

/// `hash * 31 + unit`，按 UTF-16 码元累加，32 位有符号回绕后取绝对值
fn hash_seed(seed: &str) -> u32 {
    let hash = seed
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_mul(31).wrapping_add(i32::from(unit))
        });
    hash.unsigned_abs()
}
