/// 每个手势姿态的关键点数量（手腕 + 5 根手指 × 4 个关节）
pub const LANDMARK_COUNT: usize = 21;

/// 分类器特征维度：21 × {x, y, z}
pub const FEATURE_COUNT: usize = LANDMARK_COUNT * 3;

/// 误差到分数的指数衰减系数：score = 100 * exp(-DECAY_RATE * mse)
pub const DECAY_RATE: f64 = 10.0;

/// 默认通过阈值（含边界）
pub const PASS_THRESHOLD: f64 = 75.0;

/// 达到此分数只返回鼓励性提示
pub const EXCELLENT_THRESHOLD: f64 = 90.0;

pub const MAX_SCORE: f64 = 100.0;

/// 单次评分请求允许的最大帧数（约 4 秒 @ 30fps）
pub const MAX_FRAMES_PER_ATTEMPT: usize = 120;

/// 未提供可见度时的默认值
pub const DEFAULT_VISIBILITY: f64 = 1.0;
