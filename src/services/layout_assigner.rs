//! 布局分配 - 业务能力层
//!
//! 只根据单元序号决定布局，无状态、无计数器

use crate::models::LayoutType;

const EXTENDED_CYCLE: [LayoutType; 5] = [
    LayoutType::TextWithImage,
    LayoutType::ThreeColumn,
    LayoutType::ThreeBullets,
    LayoutType::TextWithImage,
    LayoutType::FourNumbered,
];

const CLASSIC_CYCLE: [LayoutType; 3] = [
    LayoutType::BulletList,
    LayoutType::TextWithImage,
    LayoutType::ThreeColumn,
];

/// 内容单元（序号 ≥ 2）使用的布局轮换表
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutCycle {
    /// 五种布局轮换
    #[default]
    Extended,
    /// 三种布局轮换
    Classic,
}

impl LayoutCycle {
    pub fn layouts(self) -> &'static [LayoutType] {
        match self {
            LayoutCycle::Extended => &EXTENDED_CYCLE,
            LayoutCycle::Classic => &CLASSIC_CYCLE,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "extended" => Some(LayoutCycle::Extended),
            "classic" => Some(LayoutCycle::Classic),
            _ => None,
        }
    }
}

/// 布局分配器
///
/// 一个任务只持有一个分配器，保证同一任务内不会混用轮换表
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutAssigner {
    cycle: LayoutCycle,
}

impl LayoutAssigner {
    pub fn new(cycle: LayoutCycle) -> Self {
        Self { cycle }
    }

    pub fn cycle(&self) -> LayoutCycle {
        self.cycle
    }

    /// 序号从 1 开始；序号 0 按标题页处理
    pub fn assign(&self, index: usize) -> LayoutType {
        if index <= 1 {
            return LayoutType::Title;
        }
        let layouts = self.cycle.layouts();
        layouts[(index - 2) % layouts.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_is_title() {
        assert_eq!(LayoutAssigner::default().assign(1), LayoutType::Title);
        assert_eq!(LayoutAssigner::new(LayoutCycle::Classic).assign(1), LayoutType::Title);
    }

    #[test]
    fn test_seven_units() {
        let assigner = LayoutAssigner::default();
        let seq: Vec<_> = (1..=7).map(|i| assigner.assign(i)).collect();
        assert_eq!(
            seq,
            vec![
                LayoutType::Title,
                LayoutType::TextWithImage,
                LayoutType::ThreeColumn,
                LayoutType::ThreeBullets,
                LayoutType::TextWithImage,
                LayoutType::FourNumbered,
                LayoutType::TextWithImage,
            ]
        );
    }

    #[test]
    fn test_periodic() {
        for cycle in [LayoutCycle::Extended, LayoutCycle::Classic] {
            let assigner = LayoutAssigner::new(cycle);
            let period = cycle.layouts().len();
            for index in 2..200 {
                assert_eq!(assigner.assign(index), assigner.assign(index + period));
                assert_ne!(assigner.assign(index), LayoutType::Title);
            }
        }
    }

    #[test]
    fn test_classic_cycle() {
        let assigner = LayoutAssigner::new(LayoutCycle::Classic);
        assert_eq!(assigner.assign(2), LayoutType::BulletList);
        assert_eq!(assigner.assign(3), LayoutType::TextWithImage);
        assert_eq!(assigner.assign(4), LayoutType::ThreeColumn);
        assert_eq!(assigner.assign(5), LayoutType::BulletList);
    }
}
