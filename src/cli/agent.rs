//! agent 子命令：Markdown 智能体定义的创建与列表
//!
//! 智能体以带 YAML front matter 的 .md 文件存放在 agents 目录。

use crate::config::load_config;

pub async fn agent_command(list: bool, create: bool, name: Option<String>) -> anyhow::Result<()> {
    let cfg = load_config(None).unwrap_or_default();
    let agents_dir = cfg.agent.agents_dir;
    std::fs::create_dir_all(&agents_dir)?;

    if create {
        let Some(name) = name else {
            eprintln!("Error: --name is required when creating an agent");
            return Ok(());
        };

        let agent_file = agents_dir.join(format!("{}.md", name));
        if agent_file.exists() {
            eprintln!("Agent already exists: {}", name);
            return Ok(());
        }

        let content = format!(
            "---\nname: {name}\nmodel: {model}\ntools:\n  - read\n  - write\n  - bash\n  - glob\n  - grep\n---\n\n# {name} Agent\n\nDescribe your agent here.\n",
            name = name,
            model = cfg.provider.model,
        );
        std::fs::write(&agent_file, content)?;
        println!("Created agent: {}", name);
        return Ok(());
    }

    if !list {
        println!("Use --list to list agents or --create to create one");
        return Ok(());
    }

    let mut agents: Vec<_> = std::fs::read_dir(&agents_dir)?
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().map(|x| x == "md").unwrap_or(false))
        .collect();
    agents.sort();

    if agents.is_empty() {
        println!("No agents found");
        println!("Create one: drone agent --create --name myagent");
        return Ok(());
    }

    println!("Agents:");
    for path in agents {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        println!("  {:<20} {}", stem, file);
    }
    Ok(())
}
