//! 显示命令
//!
//! 文本形式的显示命令先解析为 [`DisplayCommand`]，再作用到 Frame 的 Show/View 上。
//! 命令名前加 `!` 表示关闭，后缀 `?` 返回用法说明（以 [`CommandError::Usage`] 形式）。
//! `fence` 与 `kijun` 同时通过选择集选中构件或节点。

use crate::error::{CommandError, Result};
use crate::selection::Selection;
use kozo_core::element::Etype;
use kozo_core::frame::Frame;
use kozo_core::math::{Axis, Vector3};
use kozo_core::node::{NodeId, DOF_NAMES};
use kozo_core::section::SectId;
use kozo_core::show::{
    CaptionMask, ColorMode, Measure, Show, View, STRESS_MX, STRESS_MY, STRESS_MZ, STRESS_N,
    STRESS_QX, STRESS_QY,
};
use kozo_core::stress::PeriodExpr;

#[derive(Debug, Clone, PartialEq)]
pub enum FocusTarget {
    /// 模型包围盒中心
    Center,
    Node(NodeId),
    Elem(u32),
    Point(Vector3),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Factor {
    Disp,
    Reaction,
    Shear,
    Moment,
}

/// 列表参数的作用方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// 只显示列出的项
    Only,
    /// `+`：追加显示
    Add,
    /// `-`：取消显示
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StressTarget {
    Etype(Etype),
    Sect(SectId),
    /// `range(a,b)`：编号在 a..=b 的断面
    Range(SectId, SectId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    Long,
    Short,
    Q,
    M,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caption {
    ElemCode,
    SectCode,
    Weight,
    Conf,
    NodeCode,
    PileCode,
    Eccentric,
    SrcanColor,
    /// None 表示全部检定比
    SrcanRate(Option<RateKind>),
    Energy,
    NodeColor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MeasureTarget {
    /// 相邻基准线之间
    Kijun,
    Nodes {
        start: NodeId,
        end: NodeId,
        axis: Option<Axis>,
        offset: f64,
        dot: f64,
        rotate: f64,
        text: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCommand {
    Focus(FocusTarget),
    Angle(f64, f64),
    Dists(f64, f64),
    /// true 为透视，false 为轴测
    Perspective(bool),
    Factor(Factor, f64),
    Elem(SetMode, Vec<Etype>),
    Section(SetMode, Vec<SectId>),
    Fence(Axis, f64),
    Period(String),
    PeriodStep(i32),
    Stress {
        target: StressTarget,
        period: String,
        components: u32,
    },
    Deformation(Option<String>),
    Disp {
        period: String,
        index: usize,
    },
    Kijun(Vec<String>),
    Measure(MeasureTarget),
    Caption(Caption),
    NoCaption,
}

/// 解析结果：命令与是否带 `!` 前缀
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub command: DisplayCommand,
    pub off: bool,
}

fn usage(word: &str) -> Option<&'static str> {
    Some(match word {
        "focus" => "focus center|node <id>|elem <id>|<x> <y> <z>",
        "angle" => "angle <phi> <theta>",
        "dists" => "dists <r> <l>",
        "perspective" | "axonometric" => "perspective | axonometric",
        "dfact" | "rfact" | "qfact" | "mfact" => "dfact|rfact|qfact|mfact <value>",
        "elem" => "elem [+|-] <etype...>",
        "section" => "section [+|-] <id...>",
        "fence" => "fence x|y|z <coord>",
        "period" | "period++" | "period--" => "period <name> | period++ | period--",
        "stress" => "stress <etype|sectid|range(a,b)> <period> n|qx|qy|mz|mx|my",
        "deformation" => "deformation [period]",
        "disp" => "disp <period> x|y|z|tx|ty|tz",
        "kijun" => "kijun [name...]",
        "measure" => "measure kijun | <n1> <n2> [axis] <offset> <dot> <rotate> [text]",
        "elemcode" | "sectcode" | "weight" | "conf" | "nodecode" | "pilecode" | "eccentric"
        | "srcancolor" | "energy" | "ncolor" => "[!]<caption>",
        "srcanrate" => "srcanrate [long|short|q|m]",
        "nocaption" => "nocaption",
        _ => return None,
    })
}

fn number<T: std::str::FromStr>(token: Option<&str>, what: &str) -> Result<T> {
    let token = token.ok_or_else(|| CommandError::InvalidArgument(format!("missing {}", what)))?;
    token
        .parse()
        .map_err(|_| CommandError::InvalidArgument(format!("{}: {}", what, token)))
}

fn float(token: Option<&str>, what: &str) -> Result<f64> {
    let v: f64 = number(token, what)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CommandError::InvalidArgument(format!("{}: {}", what, v)))
    }
}

fn axis(token: Option<&str>) -> Result<Axis> {
    let token = token.ok_or_else(|| CommandError::InvalidArgument("missing axis".into()))?;
    token.parse().map_err(CommandError::InvalidArgument)
}

fn period(token: Option<&str>) -> Result<String> {
    let token = token.ok_or_else(|| CommandError::InvalidArgument("missing period".into()))?;
    PeriodExpr::parse(token)?;
    Ok(token.to_ascii_uppercase())
}

/// 列表参数前的可选 `+` / `-`
fn set_mode<'a>(rest: &[&'a str]) -> (SetMode, Vec<&'a str>) {
    match rest.first() {
        Some(&"+") => (SetMode::Add, rest[1..].to_vec()),
        Some(&"-") | Some(&"−") => (SetMode::Remove, rest[1..].to_vec()),
        _ => (SetMode::Only, rest.to_vec()),
    }
}

fn stress_target(token: &str) -> Result<StressTarget> {
    if let Some(inner) = token
        .strip_prefix("range(")
        .and_then(|t| t.strip_suffix(')'))
    {
        let mut parts = inner.split(',').map(str::trim);
        let a = number(parts.next(), "range start")?;
        let b = number(parts.next(), "range end")?;
        return Ok(StressTarget::Range(a, b));
    }
    if let Ok(sect) = token.parse::<SectId>() {
        return Ok(StressTarget::Sect(sect));
    }
    Ok(StressTarget::Etype(token.parse()?))
}

fn stress_component(token: &str) -> Result<u32> {
    Ok(match token.to_ascii_lowercase().as_str() {
        "n" => STRESS_N,
        "qx" => STRESS_QX,
        "qy" => STRESS_QY,
        "mz" => STRESS_MZ,
        "mx" => STRESS_MX,
        "my" => STRESS_MY,
        _ => {
            return Err(CommandError::InvalidArgument(format!(
                "stress component: {}",
                token
            )))
        }
    })
}

fn parse_measure(rest: &[&str]) -> Result<MeasureTarget> {
    if rest.first().map(|t| t.eq_ignore_ascii_case("kijun")) == Some(true) {
        return Ok(MeasureTarget::Kijun);
    }
    let mut it = rest.iter().copied().peekable();
    let start = number(it.next(), "start node")?;
    let end = number(it.next(), "end node")?;
    let axis = match it.peek().and_then(|t| t.parse::<Axis>().ok()) {
        Some(a) => {
            it.next();
            Some(a)
        }
        None => None,
    };
    let offset = float(it.next(), "offset")?;
    let dot = float(it.next(), "dot")?;
    let rotate = float(it.next(), "rotate")?;
    let text: Vec<&str> = it.collect();
    Ok(MeasureTarget::Nodes {
        start,
        end,
        axis,
        offset,
        dot,
        rotate,
        text: (!text.is_empty()).then(|| text.join(" ")),
    })
}

/// 解析一行显示命令
pub fn parse(input: &str) -> Result<Parsed> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let Some((&first, rest)) = tokens.split_first() else {
        return Err(CommandError::InvalidArgument("empty command".into()));
    };
    let (off, word) = match first.strip_prefix('!') {
        Some(w) => (true, w),
        None => (false, first),
    };
    let word = word.to_ascii_lowercase();
    if let Some(w) = word.strip_suffix('?') {
        return Err(match usage(w) {
            Some(u) => CommandError::Usage(u),
            None => CommandError::UnknownCommand(w.to_string()),
        });
    }

    let mut args = rest.iter().copied();
    let command = match word.as_str() {
        "focus" => DisplayCommand::Focus(match args.next() {
            None | Some("center") => FocusTarget::Center,
            Some("node") => FocusTarget::Node(number(args.next(), "node")?),
            Some("elem") => FocusTarget::Elem(number(args.next(), "elem")?),
            Some(x) => {
                let x = float(Some(x), "x")?;
                let y = float(args.next(), "y")?;
                let z = float(args.next(), "z")?;
                FocusTarget::Point(Vector3::new(x, y, z))
            }
        }),
        "angle" => DisplayCommand::Angle(float(args.next(), "phi")?, float(args.next(), "theta")?),
        "dists" => DisplayCommand::Dists(float(args.next(), "r")?, float(args.next(), "l")?),
        "perspective" => DisplayCommand::Perspective(true),
        "axonometric" => DisplayCommand::Perspective(false),
        "dfact" | "rfact" | "qfact" | "mfact" => {
            let kind = match word.as_bytes()[0] {
                b'd' => Factor::Disp,
                b'r' => Factor::Reaction,
                b'q' => Factor::Shear,
                _ => Factor::Moment,
            };
            DisplayCommand::Factor(kind, float(args.next(), &word)?)
        }
        "elem" => {
            let (mode, list) = set_mode(rest);
            let etypes = list
                .iter()
                .map(|t| t.parse::<Etype>())
                .collect::<kozo_core::Result<Vec<_>>>()?;
            DisplayCommand::Elem(mode, etypes)
        }
        "section" => {
            let (mode, list) = set_mode(rest);
            let ids = list
                .iter()
                .map(|t| number(Some(*t), "section"))
                .collect::<Result<Vec<SectId>>>()?;
            DisplayCommand::Section(mode, ids)
        }
        "fence" => DisplayCommand::Fence(axis(args.next())?, float(args.next(), "coord")?),
        "period" => DisplayCommand::Period(period(args.next())?),
        "period++" => DisplayCommand::PeriodStep(1),
        "period--" => DisplayCommand::PeriodStep(-1),
        "stress" => {
            let target = stress_target(
                args.next()
                    .ok_or_else(|| CommandError::InvalidArgument("missing target".into()))?,
            )?;
            let period = period(args.next())?;
            let mut components = 0;
            for t in args.by_ref() {
                components |= stress_component(t)?;
            }
            if components == 0 {
                return Err(CommandError::InvalidArgument("missing stress component".into()));
            }
            DisplayCommand::Stress {
                target,
                period,
                components,
            }
        }
        "deformation" => DisplayCommand::Deformation(match args.next() {
            Some(p) => Some(period(Some(p))?),
            None => None,
        }),
        "disp" => {
            let period = period(args.next())?;
            let dof = args
                .next()
                .ok_or_else(|| CommandError::InvalidArgument("missing component".into()))?;
            let index = DOF_NAMES
                .iter()
                .position(|d| d.eq_ignore_ascii_case(dof))
                .ok_or_else(|| CommandError::InvalidArgument(format!("component: {}", dof)))?;
            DisplayCommand::Disp { period, index }
        }
        "kijun" => DisplayCommand::Kijun(rest.iter().map(|s| s.to_string()).collect()),
        // 关闭时清空全部测量，不读参数
        "measure" if off => DisplayCommand::Measure(MeasureTarget::Kijun),
        "measure" => DisplayCommand::Measure(parse_measure(rest)?),
        "elemcode" => DisplayCommand::Caption(Caption::ElemCode),
        "sectcode" => DisplayCommand::Caption(Caption::SectCode),
        "weight" => DisplayCommand::Caption(Caption::Weight),
        "conf" => DisplayCommand::Caption(Caption::Conf),
        "nodecode" => DisplayCommand::Caption(Caption::NodeCode),
        "pilecode" => DisplayCommand::Caption(Caption::PileCode),
        "eccentric" => DisplayCommand::Caption(Caption::Eccentric),
        "srcancolor" => DisplayCommand::Caption(Caption::SrcanColor),
        "srcanrate" => {
            let kind = match args.next().map(str::to_ascii_lowercase).as_deref() {
                None => None,
                Some("long") => Some(RateKind::Long),
                Some("short") => Some(RateKind::Short),
                Some("q") => Some(RateKind::Q),
                Some("m") => Some(RateKind::M),
                Some(other) => {
                    return Err(CommandError::InvalidArgument(format!("srcanrate {}", other)))
                }
            };
            DisplayCommand::Caption(Caption::SrcanRate(kind))
        }
        "energy" => DisplayCommand::Caption(Caption::Energy),
        "ncolor" => DisplayCommand::Caption(Caption::NodeColor),
        "nocaption" => DisplayCommand::NoCaption,
        _ => return Err(CommandError::UnknownCommand(word)),
    };
    Ok(Parsed { command, off })
}

fn rate_bits(kind: Option<RateKind>) -> u32 {
    match kind {
        Some(RateKind::Long) => CaptionMask::ELEM_RATE_L,
        Some(RateKind::Short) => CaptionMask::ELEM_RATE_S,
        Some(RateKind::Q) => CaptionMask::ELEM_RATE_Q,
        Some(RateKind::M) => CaptionMask::ELEM_RATE_M,
        None => {
            CaptionMask::ELEM_RATE_L
                | CaptionMask::ELEM_RATE_S
                | CaptionMask::ELEM_RATE_Q
                | CaptionMask::ELEM_RATE_M
        }
    }
}

fn apply_caption(show: &mut Show, caption: Caption, on: bool) {
    match caption {
        Caption::ElemCode => show.elem_caption.set(CaptionMask::ELEM_NUM, on),
        Caption::SectCode => show.elem_caption.set(CaptionMask::ELEM_SECT, on),
        Caption::Eccentric => show.elem_caption.set(CaptionMask::ELEM_ECCENTRIC, on),
        Caption::SrcanRate(kind) => show.elem_caption.set(rate_bits(kind), on),
        Caption::Weight => show.node_caption.set(CaptionMask::NODE_WEIGHT, on),
        Caption::Conf => show.node_caption.set(CaptionMask::NODE_CONF, on),
        Caption::NodeCode => show.node_caption.set(CaptionMask::NODE_NUM, on),
        Caption::PileCode => show.node_caption.set(CaptionMask::NODE_PILE, on),
        Caption::SrcanColor => {
            show.color_mode = if on { ColorMode::Rate } else { ColorMode::Sect };
        }
        Caption::Energy => {
            show.elem_caption.set(CaptionMask::ELEM_ENERGY, on);
            if on {
                show.color_mode = ColorMode::Energy;
            } else if show.color_mode == ColorMode::Energy {
                show.color_mode = ColorMode::Sect;
            }
        }
        Caption::NodeColor => show.node_color = on,
    }
}

/// 相邻（按名称顺序）且平行的基准线之间的尺寸
fn kijun_measures(frame: &Frame) -> Vec<Measure> {
    let kijuns: Vec<_> = frame.kijuns.values().filter(|k| !k.hide).collect();
    let mut measures = Vec::new();
    for pair in kijuns.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (Some(da), Some(db)) = (a.direction(), b.direction()) else {
            continue;
        };
        if da.cross(&db).norm() > frame.config.parallel_tol {
            continue;
        }
        let axis = if da.y.abs() > da.x.abs() {
            Axis::X
        } else {
            Axis::Y
        };
        measures.push(Measure {
            start: a.start,
            end: b.start,
            axis: Some(axis),
            offset: 0.0,
            dot: 0.0,
            rotate: 0.0,
            text: Some(format!("{}-{}", a.name, b.name)),
        });
    }
    measures
}

fn apply_set<T: Copy + PartialEq>(
    mode: SetMode,
    off: bool,
    listed: &[T],
    all: &[T],
    mut set: impl FnMut(T, bool),
) {
    if off {
        let targets = if listed.is_empty() { all } else { listed };
        for &t in targets {
            set(t, false);
        }
        return;
    }
    match mode {
        SetMode::Only => {
            for &t in all {
                set(t, listed.is_empty() || listed.contains(&t));
            }
        }
        SetMode::Add => listed.iter().for_each(|&t| set(t, true)),
        SetMode::Remove => listed.iter().for_each(|&t| set(t, false)),
    }
}

/// 把解析后的命令作用到 Frame 与选择集
pub fn apply(parsed: &Parsed, frame: &mut Frame, selection: &mut Selection) -> Result<()> {
    let off = parsed.off;
    let defaults = (View::default(), Show::default());
    match &parsed.command {
        DisplayCommand::Focus(target) => {
            frame.view.focus = if off {
                Vector3::zeros()
            } else {
                match target {
                    FocusTarget::Center => frame.bbox().map_or_else(Vector3::zeros, |b| b.center()),
                    FocusTarget::Node(n) => frame.coord(*n)?,
                    FocusTarget::Elem(e) => frame.midpoint(*e)?,
                    FocusTarget::Point(p) => *p,
                }
            };
        }
        DisplayCommand::Angle(phi, theta) => {
            frame.view.angle = if off { defaults.0.angle } else { [*phi, *theta] };
        }
        DisplayCommand::Dists(r, l) => {
            frame.view.dists = if off { defaults.0.dists } else { [*r, *l] };
        }
        DisplayCommand::Perspective(p) => frame.view.perspective = *p != off,
        DisplayCommand::Factor(kind, v) => {
            let (field, default) = match kind {
                Factor::Disp => (&mut frame.show.dfact, defaults.1.dfact),
                Factor::Reaction => (&mut frame.show.rfact, defaults.1.rfact),
                Factor::Shear => (&mut frame.show.qfact, defaults.1.qfact),
                Factor::Moment => (&mut frame.show.mfact, defaults.1.mfact),
            };
            *field = if off { default } else { *v };
        }
        DisplayCommand::Elem(mode, etypes) => {
            let show = &mut frame.show;
            apply_set(*mode, off, etypes, &Etype::ALL, |e, on| {
                show.set_etype_visible(e, on)
            });
        }
        DisplayCommand::Section(mode, ids) => {
            let all: Vec<SectId> = frame.sects().map(|s| s.num).collect();
            let show = &mut frame.show;
            apply_set(*mode, off, ids, &all, |s, on| show.set_sect_visible(s, on));
        }
        DisplayCommand::Fence(axis, coord) => {
            let ids = frame.fence(*axis, *coord, false);
            selection.merge_select_elems(&ids, off);
        }
        DisplayCommand::Period(p) => {
            if off {
                return Err(CommandError::InvalidArgument("!period".into()));
            }
            frame.show.period = p.clone();
        }
        DisplayCommand::PeriodStep(step) => frame.show.step_period(*step),
        DisplayCommand::Stress {
            target,
            period,
            components,
        } => {
            let sects: Vec<SectId> = match target {
                StressTarget::Etype(_) => Vec::new(),
                StressTarget::Sect(s) => vec![*s],
                StressTarget::Range(a, b) => frame
                    .sects()
                    .map(|s| s.num)
                    .filter(|n| (*a..=*b).contains(n))
                    .collect(),
            };
            let show = &mut frame.show;
            let update = |mask: &mut u32| {
                if off {
                    *mask &= !components;
                } else {
                    *mask |= components;
                }
            };
            match target {
                StressTarget::Etype(e) => update(&mut show.stress_etype[e.index()]),
                _ => {
                    for s in sects {
                        update(show.stress_sect.entry(s).or_insert(0));
                    }
                    show.stress_sect.retain(|_, m| *m != 0);
                }
            }
            if !off {
                show.period = period.clone();
            }
        }
        DisplayCommand::Deformation(period) => {
            frame.show.deformation = !off;
            if let (false, Some(p)) = (off, period) {
                frame.show.period = p.clone();
            }
        }
        DisplayCommand::Disp { period, index } => {
            frame.show.disp[*index] = !off;
            if !off {
                frame.show.period = period.clone();
            }
        }
        DisplayCommand::Kijun(names) => {
            frame.show.kijun = !off;
            if !names.is_empty() {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                let nodes = frame.kijun_nodes(&names)?;
                selection.merge_select_nodes(&nodes, off);
            }
        }
        DisplayCommand::Measure(target) => {
            if off {
                frame.show.measures.clear();
                return Ok(());
            }
            match target {
                MeasureTarget::Kijun => {
                    let measures = kijun_measures(frame);
                    frame.show.measures.extend(measures);
                }
                MeasureTarget::Nodes {
                    start,
                    end,
                    axis,
                    offset,
                    dot,
                    rotate,
                    text,
                } => {
                    let measure = Measure {
                        start: frame.coord(*start)?,
                        end: frame.coord(*end)?,
                        axis: *axis,
                        offset: *offset,
                        dot: *dot,
                        rotate: *rotate,
                        text: text.clone(),
                    };
                    frame.show.measures.push(measure);
                }
            }
        }
        DisplayCommand::Caption(caption) => apply_caption(&mut frame.show, *caption, !off),
        DisplayCommand::NoCaption => {
            frame.show.node_caption.clear();
            frame.show.elem_caption.clear();
        }
    }
    tracing::debug!("display: {:?} off={}", parsed.command, off);
    Ok(())
}

/// 解析并执行；便于驱动方把错误写入历史消息
pub fn execute(input: &str, frame: &mut Frame, selection: &mut Selection) -> Result<()> {
    let parsed = parse(input)?;
    apply(&parsed, frame, selection)
}
