//! JWT authentication under `src/auth/`.

use std::path::{Path, PathBuf};

use crudforge_codegen::CredentialStore;
use crudforge_core::{FileRules, GeneratedFile};

use crate::project::TsProject;

fn auth(base: &Path, file: &str) -> PathBuf {
    base.join("src").join("auth").join(file)
}

/// `src/auth/password.ts`: bcrypt hashing.
pub struct PasswordTs;

impl GeneratedFile for PasswordTs {
    fn path(&self, base: &Path) -> PathBuf {
        auth(base, "password.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"import * as bcrypt from 'bcryptjs';

const ROUNDS = 10;

export function hashPassword(password: string): Promise<string> {
  return bcrypt.hash(password, ROUNDS);
}

export function verifyPassword(password: string, hash: string): Promise<boolean> {
  return bcrypt.compare(password, hash);
}
"#
        .to_string()
    }
}

/// `src/auth/credentials.dto.ts`: register/login body and token response.
pub struct CredentialsDtoTs;

impl GeneratedFile for CredentialsDtoTs {
    fn path(&self, base: &Path) -> PathBuf {
        auth(base, "credentials.dto.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"import { IsEmail, IsString, MinLength } from 'class-validator';

export class CredentialsDto {
  @IsEmail()
  email!: string;

  @IsString()
  @MinLength(8)
  password!: string;
}

export interface TokenResponse {
  accessToken: string;
  tokenType: 'Bearer';
}
"#
        .to_string()
    }
}

/// `src/auth/auth.service.ts`: credential queries and token issuing.
pub struct AuthServiceTs<'a> {
    project: TsProject<'a>,
}

impl<'a> AuthServiceTs<'a> {
    pub fn new(project: TsProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for AuthServiceTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        auth(base, "auth.service.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let store = CredentialStore::resolve(self.project.model);
        let dialect = self.project.dialect;
        let table = dialect.ident(&store.table);
        let id = dialect.ident(&store.id_column);
        let email = dialect.ident(&store.email_column);
        let password = dialect.ident(&store.password_column);

        let insert = format!(
            "INSERT INTO {table} ({email}, {password}) VALUES ({}, {})",
            dialect.placeholder(1),
            dialect.placeholder(2)
        );
        let select_id = format!(
            "SELECT {id} AS id FROM {table} WHERE {email} = {}",
            dialect.placeholder(1)
        );
        let select_login = format!(
            "SELECT {id} AS id, {password} AS hash FROM {table} WHERE {email} = {}",
            dialect.placeholder(1)
        );
        let note = if store.is_declared() {
            String::new()
        } else {
            format!(
                "// The schema declares no credential table; this service expects\n// `{} ({} PRIMARY KEY, {} UNIQUE, {})` to exist.\n\n",
                store.table, store.id_column, store.email_column, store.password_column
            )
        };

        format!(
            r#"{note}import {{ ConflictException, Injectable, UnauthorizedException }} from '@nestjs/common';
import {{ JwtService }} from '@nestjs/jwt';
import {{ DataSource }} from 'typeorm';

import {{ CredentialsDto, TokenResponse }} from './credentials.dto';
import {{ hashPassword, verifyPassword }} from './password';

interface CredentialRow {{
  id: number | string;
  hash: string | null;
}}

@Injectable()
export class AuthService {{
  constructor(
    private readonly dataSource: DataSource,
    private readonly jwt: JwtService,
  ) {{}}

  async register(input: CredentialsDto): Promise<TokenResponse> {{
    const existing: CredentialRow[] = await this.dataSource.query('{select_id}', [input.email]);
    if (existing.length > 0) {{
      throw new ConflictException('email is already registered');
    }}
    const hash = await hashPassword(input.password);
    await this.dataSource.query('{insert}', [input.email, hash]);
    const rows: CredentialRow[] = await this.dataSource.query('{select_id}', [input.email]);
    return this.issue(rows[0].id);
  }}

  async login(input: CredentialsDto): Promise<TokenResponse> {{
    const rows: CredentialRow[] = await this.dataSource.query('{select_login}', [input.email]);
    const row = rows[0];
    if (!row || !row.hash || !(await verifyPassword(input.password, row.hash))) {{
      throw new UnauthorizedException('invalid email or password');
    }}
    return this.issue(row.id);
  }}

  private async issue(id: number | string): Promise<TokenResponse> {{
    const accessToken = await this.jwt.signAsync({{ sub: String(id) }});
    return {{ accessToken, tokenType: 'Bearer' }};
  }}
}}
"#
        )
    }
}

/// `src/auth/auth.controller.ts`: `POST /auth/register` and `/auth/login`.
pub struct AuthControllerTs;

impl GeneratedFile for AuthControllerTs {
    fn path(&self, base: &Path) -> PathBuf {
        auth(base, "auth.controller.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"import { Body, Controller, HttpCode, Post } from '@nestjs/common';

import { AuthService } from './auth.service';
import { CredentialsDto, TokenResponse } from './credentials.dto';

@Controller('auth')
export class AuthController {
  constructor(private readonly auth: AuthService) {}

  @Post('register')
  register(@Body() input: CredentialsDto): Promise<TokenResponse> {
    return this.auth.register(input);
  }

  @Post('login')
  @HttpCode(200)
  login(@Body() input: CredentialsDto): Promise<TokenResponse> {
    return this.auth.login(input);
  }
}
"#
        .to_string()
    }
}

/// `src/auth/jwt-auth.guard.ts`: rejects requests without a valid bearer token.
pub struct JwtGuardTs;

impl GeneratedFile for JwtGuardTs {
    fn path(&self, base: &Path) -> PathBuf {
        auth(base, "jwt-auth.guard.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"import { CanActivate, ExecutionContext, Injectable, UnauthorizedException } from '@nestjs/common';
import { JwtService } from '@nestjs/jwt';
import { Request } from 'express';

export interface Claims {
  sub: string;
}

@Injectable()
export class JwtAuthGuard implements CanActivate {
  constructor(private readonly jwt: JwtService) {}

  async canActivate(context: ExecutionContext): Promise<boolean> {
    const request = context.switchToHttp().getRequest<Request & { user?: Claims }>();
    const [scheme, token] = (request.headers.authorization ?? '').split(' ');
    if (scheme !== 'Bearer' || !token) {
      throw new UnauthorizedException();
    }
    try {
      request.user = await this.jwt.verifyAsync<Claims>(token);
    } catch {
      throw new UnauthorizedException();
    }
    return true;
  }
}
"#
        .to_string()
    }
}

/// `src/auth/auth.module.ts`: global so every entity module can use the guard.
pub struct AuthModuleTs;

impl GeneratedFile for AuthModuleTs {
    fn path(&self, base: &Path) -> PathBuf {
        auth(base, "auth.module.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"import { Global, Module } from '@nestjs/common';
import { JwtModule } from '@nestjs/jwt';

import { loadConfig } from '../config';
import { AuthController } from './auth.controller';
import { AuthService } from './auth.service';
import { JwtAuthGuard } from './jwt-auth.guard';

@Global()
@Module({
  imports: [
    JwtModule.registerAsync({
      useFactory: () => {
        const config = loadConfig();
        return {
          secret: config.jwtSecret,
          signOptions: { expiresIn: config.jwtTtlSecs },
        };
      },
    }),
  ],
  controllers: [AuthController],
  providers: [AuthService, JwtAuthGuard],
  exports: [JwtModule, JwtAuthGuard],
})
export class AuthModule {}
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, all_features, compile_sql_with};
    use crudforge_schema::Target;

    use super::*;

    fn service(sql: &str) -> String {
        let ctx = compile_sql_with(sql, Target::TypescriptNestjs, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        AuthServiceTs::new(TsProject::new(&model, &computed)).render()
    }

    #[test]
    fn test_auth_service_uses_declared_table() {
        let content = service(BLOG_SQL);
        assert!(content.contains(
            "'INSERT INTO users (email, password_hash) VALUES ($1, $2)'"
        ));
        assert!(content.contains("'SELECT id AS id, password_hash AS hash FROM users WHERE email = $1'"));
        assert!(!content.contains("declares no credential table"));
    }

    #[test]
    fn test_auth_service_notes_assumed_table() {
        let content = service(PRODUCT_SQL);
        assert!(content.starts_with("// The schema declares no credential table"));
    }
}
