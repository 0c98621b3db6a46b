//! 命令注册表
//!
//! 完整命令名、快捷键和别名到 [`CommandType`] 的映射。
//! 进程内共用一份，启动时以 [`CommandRegistry::init_global`] 初始化。

use crate::command::CommandType;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::RwLock;

static GLOBAL: OnceCell<RwLock<CommandRegistry>> = OnceCell::new();

#[derive(Debug, Clone)]
pub struct CommandRegistry {
    /// 完整命令 -> CommandType
    main_commands: HashMap<String, CommandType>,
    /// 快捷键 -> CommandType
    short_commands: HashMap<String, CommandType>,
    /// 别名 -> 完整命令
    aliases: HashMap<String, String>,
    command_names: HashMap<CommandType, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            main_commands: HashMap::new(),
            short_commands: HashMap::new(),
            aliases: HashMap::new(),
            command_names: HashMap::new(),
        };
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        self.register(CommandType::MatchProperty, "MATCHPROPERTY", &["MP", "MATCHPROP"]);
        self.register(CommandType::DivideAtOns, "DIVIDEATONS", &["DO", "DIVONS"]);
        self.register(CommandType::RotateZero, "ROTATEZERO", &["RZ"]);
        self.register(CommandType::Cutter, "CUTTER", &["CT"]);
        self.register(CommandType::SetCang, "SETCANG", &["SC"]);
    }

    /// 初始化进程内注册表；重复调用无效果
    pub fn init_global() -> &'static RwLock<CommandRegistry> {
        GLOBAL.get_or_init(|| {
            tracing::debug!("command registry initialised");
            RwLock::new(CommandRegistry::new())
        })
    }

    /// 进程内注册表；尚未初始化时为 None
    pub fn global() -> Option<&'static RwLock<CommandRegistry>> {
        GLOBAL.get()
    }

    pub fn register(&mut self, command: CommandType, full_cmd: &str, shortcuts: &[&str]) {
        let full = full_cmd.to_uppercase();
        self.main_commands.insert(full.clone(), command);
        self.command_names.insert(command, full);
        for s in shortcuts {
            self.short_commands.insert(s.to_uppercase(), command);
        }
    }

    /// 依次查完整命令、快捷键、别名
    pub fn lookup(&self, input: &str) -> Option<CommandType> {
        let key = input.trim().to_uppercase();
        if let Some(&c) = self.main_commands.get(&key) {
            return Some(c);
        }
        if let Some(&c) = self.short_commands.get(&key) {
            return Some(c);
        }
        self.aliases
            .get(&key)
            .and_then(|full| self.main_commands.get(full).copied())
    }

    /// 以 prefix 开头的完整命令（排序）
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.to_uppercase();
        let mut results: Vec<String> = self
            .main_commands
            .keys()
            .filter(|cmd| cmd.starts_with(&prefix))
            .cloned()
            .collect();
        results.sort();
        results
    }

    pub fn command_name(&self, command: CommandType) -> Option<&str> {
        self.command_names.get(&command).map(String::as_str)
    }

    /// 添加别名；不能覆盖已有命令，目标必须存在
    pub fn add_alias(&mut self, alias: &str, command: &str) -> bool {
        let alias = alias.to_uppercase();
        let command = command.to_uppercase();
        if self.main_commands.contains_key(&alias) || !self.main_commands.contains_key(&command) {
            return false;
        }
        self.aliases.insert(alias, command);
        true
    }

    pub fn remove_alias(&mut self, alias: &str) {
        self.aliases.remove(&alias.to_uppercase());
    }

    /// 从文本加载别名：每行 "alias command"，# 开头为注释
    pub fn load_aliases(&mut self, content: &str) -> usize {
        content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| {
                let mut parts = l.split_whitespace();
                Some((parts.next()?, parts.next()?))
            })
            .filter(|(alias, command)| self.add_alias(alias, command))
            .count()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.lookup("matchproperty"), Some(CommandType::MatchProperty));
        assert_eq!(registry.lookup("MP"), Some(CommandType::MatchProperty));
        assert_eq!(registry.lookup(" ct "), Some(CommandType::Cutter));
        assert_eq!(registry.lookup("LINE"), None);
    }

    #[test]
    fn test_aliases() {
        let mut registry = CommandRegistry::new();
        let n = registry.load_aliases("# comment\nmatch MATCHPROPERTY\ncut cutter\nbad NOPE\n");
        assert_eq!(n, 2);
        assert_eq!(registry.lookup("match"), Some(CommandType::MatchProperty));
        assert!(!registry.add_alias("CUTTER", "SETCANG"));
        registry.remove_alias("cut");
        assert_eq!(registry.lookup("cut"), None);
    }

    #[test]
    fn test_complete() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.complete("set"), vec!["SETCANG".to_string()]);
    }

    #[test]
    fn test_global_is_initialised_once() {
        let a = CommandRegistry::init_global();
        let b = CommandRegistry::init_global();
        assert!(std::ptr::eq(a, b));
        assert!(CommandRegistry::global().is_some());
    }
}
